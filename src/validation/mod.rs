/*!
 * Validation of generated subtitle tracks.
 *
 * - `timecodes`: line timing integrity (inverted ranges, overlaps, gaps)
 */

pub mod timecodes;

pub use timecodes::{TimecodeIssue, TimecodeValidationResult, TimecodeValidator, TimecodeValidatorConfig};
