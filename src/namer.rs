use crate::{color::Color, error::Error, palette::Palette, Result};

/// The palette entry closest to `rgb` by squared Euclidean distance. The first entry wins a tie.
pub fn nearest_color(rgb: (u8, u8, u8), palette: &Palette) -> Result<&Color> {
    let mut nearest: Option<(&Color, u32)> = None;

    for color in palette {
        let distance = color.distance_squared(rgb);

        if nearest.map_or(true, |(_, nearest_distance)| distance < nearest_distance) {
            nearest = Some((color, distance));
        }
    }

    nearest.map(|(color, _)| color).ok_or(Error::EmptyPalette)
}

/// Name `rgb` after its nearest palette entry.
pub fn name_color(rgb: (u8, u8, u8), palette: &Palette) -> Result<&str> {
    nearest_color(rgb, palette).map(Color::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Palette {
        Palette::parse(source).unwrap()
    }

    #[test]
    fn exact_match_wins() {
        let palette = parse("black 0 0 0\nolive 128 128 0\nwhite 255 255 255");

        let nearest = nearest_color((128, 128, 0), &palette).unwrap();
        assert_eq!(nearest.name(), "olive");
        assert_eq!(nearest.distance_squared((128, 128, 0)), 0);
    }

    #[test]
    fn picks_minimum_distance() {
        let palette = parse("black 0 0 0\nwhite 255 255 255");

        assert_eq!(name_color((100, 100, 100), &palette).unwrap(), "black");
        assert_eq!(name_color((150, 150, 150), &palette).unwrap(), "white");
    }

    #[test]
    fn first_entry_wins_a_tie() {
        let palette = parse("red 255 0 0\nblue 0 0 255");
        assert_eq!(name_color((127, 0, 127), &palette).unwrap(), "red");

        let palette = parse("blue 0 0 255\nred 255 0 0");
        assert_eq!(name_color((127, 0, 127), &palette).unwrap(), "blue");
    }

    #[test]
    fn exact_duplicates_resolve_to_first() {
        let palette = parse("crimson 220 20 60\nscarlet 220 20 60");
        assert_eq!(name_color((220, 20, 60), &palette).unwrap(), "crimson");
    }

    #[test]
    fn nearer_of_duplicate_names_wins() {
        let palette = parse("red 255 0 0\ngreen 0 128 0\nred 128 0 0");

        let nearest = nearest_color((120, 5, 5), &palette).unwrap();
        assert_eq!(nearest.name(), "red");
        assert_eq!(nearest.rgb(), (128, 0, 0));
    }

    #[test]
    fn naming_is_idempotent() {
        let palette = parse("tan 210 180 140\nsienna 160 82 45\nkhaki 240 230 140");

        let first = name_color((200, 150, 100), &palette).unwrap().to_string();
        let second = name_color((200, 150, 100), &palette).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_palette_is_an_error() {
        assert!(matches!(
            name_color((0, 0, 0), &Palette::default()),
            Err(Error::EmptyPalette)
        ));
    }
}
