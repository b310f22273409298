use crate::ir::{Borehole, InputError};

/// Parse a borehole batch from JSON: either an array of boreholes or a
/// single borehole object.
pub fn parse_boreholes(input: &str) -> Result<Vec<Borehole>, InputError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') {
        let hole: Borehole = serde_json::from_str(input)?;
        return Ok(vec![hole]);
    }
    let holes: Vec<Borehole> = serde_json::from_str(input)?;
    Ok(holes)
}
