use color_labeler::image::io::Reader as ImageReader;
use std::path::Path;

// skips photos taken with flash, which wash out the colors of the subject
struct NoFlashFilter;
impl color_labeler::Filter for NoFlashFilter {
    fn is_allowed(&self, path: &Path, file_name: &str) -> bool {
        !file_name.contains("flash") && color_labeler::ExtensionFilter::default().is_allowed(path, file_name)
    }
}

fn main() {
    let palette = color_labeler::Palette::from_file(Path::new("colors.txt")).unwrap();
    let analyzer = color_labeler::Analyzer::new(&palette, color_labeler::AnalysisConfig::new(3)).unwrap();

    // analyze a single image
    let reader = ImageReader::open("swatch.png").unwrap();
    let img = reader.decode().unwrap();
    let buf = img.to_rgb8();

    let result = analyzer.analyze_image("swatch.png", &buf).unwrap();
    println!("{:#?}", result);

    // or every image of a directory that passes the custom filter
    let images = color_labeler::gather_images(Path::new("pictures"), &NoFlashFilter).unwrap();
    let report = analyzer.run(&images, |_| Ok(())).unwrap();
    println!("{:#?}", report);
}
