use crate::{error::Error, Result};

/// Per-channel arithmetic mean of `pixels`, truncated toward zero.
///
/// Truncation rather than rounding is part of the output format: a mean of 127.9 is reported as 127.
pub fn average_color(pixels: &[(u8, u8, u8)]) -> Result<(u8, u8, u8)> {
    if pixels.is_empty() {
        return Err(Error::EmptyImage);
    }

    let (red_sum, green_sum, blue_sum) = pixels
        .iter()
        .fold((0u64, 0u64, 0u64), |(red_sum, green_sum, blue_sum), &(r, g, b)| {
            (red_sum + r as u64, green_sum + g as u64, blue_sum + b as u64)
        });

    let count = pixels.len() as u64;

    // a mean of u8 values always fits back into a u8
    Ok((
        (red_sum / count) as u8,
        (green_sum / count) as u8,
        (blue_sum / count) as u8,
    ))
}
