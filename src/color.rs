use std::fmt;

/// A named reference color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    name: String,
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    pub fn new(name: impl Into<String>, (red, green, blue): (u8, u8, u8)) -> Color {
        Self {
            name: name.into(),
            red,
            green,
            blue,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Squared Euclidean distance between this color and `rgb` in raw channel space.
    pub fn distance_squared(&self, rgb: (u8, u8, u8)) -> u32 {
        let dr = self.red as i32 - rgb.0 as i32;
        let dg = self.green as i32 - rgb.1 as i32;
        let db = self.blue as i32 - rgb.2 as i32;

        (dr * dr + dg * dg + db * db) as u32
    }
}

// the palette line format: `<name> <R> <G> <B>`
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.name, self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_identical_channels() {
        let color = Color::new("teal", (0, 128, 128));
        assert_eq!(color.distance_squared((0, 128, 128)), 0);
    }

    #[test]
    fn distance_spans_the_full_cube() {
        let black = Color::new("black", (0, 0, 0));
        assert_eq!(black.distance_squared((255, 255, 255)), 3 * 255 * 255);
    }

    #[test]
    fn displays_as_palette_line() {
        assert_eq!(Color::new("red", (255, 0, 0)).to_string(), "red 255 0 0");
    }
}
