use crate::{color::Color, error::Error, Result};
use std::{fmt, path::Path, str::FromStr};

/// An ordered list of named reference colors.
///
/// Entries keep the order they were read in. Neither names nor channel values have to be unique; when two entries are
/// equally close to a color, the earlier one is used to name it (see [`crate::name_color`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Palette {
        Self { colors }
    }

    /// Parse a palette from its line format.
    ///
    /// Every line that is not blank must be `<name> <R> <G> <B>`, separated by whitespace, with each channel an integer
    /// between 0 and 255. Names are kept verbatim. An empty source gives an empty palette.
    pub fn parse(source: &str) -> Result<Palette> {
        let mut colors = Vec::new();

        for (index, line) in source.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            colors.push(parse_line(index + 1, line)?);
        }

        Ok(Self { colors })
    }

    /// Read and parse a palette file. Errors are attributed to the file's path.
    pub fn from_file<P>(path: P) -> Result<Palette>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        Palette::parse(&source).map_err(|e| e.context(path.display().to_string()))
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromStr for Palette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Palette> {
        Palette::parse(s)
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in &self.colors {
            writeln!(f, "{color}")?;
        }

        Ok(())
    }
}

impl FromIterator<Color> for Palette {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

fn parse_line(line_number: usize, line: &str) -> Result<Color> {
    let format_error = |reason: String| Error::PaletteFormat {
        line: line_number,
        content: line.to_string(),
        reason,
    };

    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let &[name, red, green, blue] = tokens.as_slice() else {
        return Err(format_error(format!(
            "expected `<name> <R> <G> <B>`, found {} tokens",
            tokens.len()
        )));
    };

    let channel = |label: &str, token: &str| {
        token
            .parse::<i64>()
            .map_err(|_| format_error(format!("{label} channel {token:?} is not an integer")))
            .and_then(|value| {
                u8::try_from(value).map_err(|_| format_error(format!("{label} channel {value} is outside 0-255")))
            })
    };

    Ok(Color::new(
        name,
        (channel("red", red)?, channel("green", green)?, channel("blue", blue)?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_in_order() {
        let palette = Palette::parse("green 0 255 0\nred 255 0 0\n").unwrap();

        assert_eq!(
            palette.colors(),
            &[Color::new("green", (0, 255, 0)), Color::new("red", (255, 0, 0))]
        );
    }

    #[test]
    fn skips_blank_lines_and_extra_whitespace() {
        let palette = Palette::parse("\n  beige\t245 245  220 \n\n   \nnavy 0 0 128").unwrap();

        assert_eq!(palette.len(), 2);
        assert_eq!(palette.colors()[0], Color::new("beige", (245, 245, 220)));
        assert_eq!(palette.colors()[1], Color::new("navy", (0, 0, 128)));
    }

    #[test]
    fn empty_source_is_an_empty_palette() {
        assert!(Palette::parse("").unwrap().is_empty());
        assert!(Palette::parse("\n \n").unwrap().is_empty());
    }

    #[test]
    fn names_are_kept_verbatim() {
        let palette = Palette::parse("Dark_Red 139 0 0\ndark_red 139 0 0").unwrap();

        assert_eq!(palette.colors()[0].name(), "Dark_Red");
        assert_eq!(palette.colors()[1].name(), "dark_red");
    }

    #[test]
    fn rejects_wrong_token_count() {
        let err = Palette::parse("red 255 0 0\ngreen 0 255").unwrap_err();

        match err {
            Error::PaletteFormat { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "green 0 255");
            }
            other => panic!("expected PaletteFormat, got {other:?}"),
        }

        assert!(matches!(
            Palette::parse("light blue 173 216 230"),
            Err(Error::PaletteFormat { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_integer_channels() {
        assert!(matches!(
            Palette::parse("red 255.0 0 0"),
            Err(Error::PaletteFormat { line: 1, .. })
        ));
        assert!(matches!(
            Palette::parse("red ff 0 0"),
            Err(Error::PaletteFormat { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_channels() {
        assert!(matches!(
            Palette::parse("red 256 0 0"),
            Err(Error::PaletteFormat { .. })
        ));
        assert!(matches!(
            Palette::parse("red -1 0 0"),
            Err(Error::PaletteFormat { .. })
        ));
    }

    #[test]
    fn round_trips_through_line_format() {
        let palette = Palette::new(vec![
            Color::new("red", (255, 0, 0)),
            Color::new("red", (200, 10, 10)),
            Color::new("black", (0, 0, 0)),
        ]);

        let reloaded: Palette = palette.to_string().parse().unwrap();
        assert_eq!(reloaded, palette);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Palette::from_file("definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
