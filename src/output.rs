use crate::{analysis::AnalysisResult, error::Error, Result};
use std::{fs::File, io::Write, path::Path};

pub const HEADER: [&str; 9] = [
    "Image Filename",
    "Avg Color Name",
    "A_Red",
    "A_Green",
    "A_Blue",
    "Dominant Color Name",
    "D_Red",
    "D_Green",
    "D_Blue",
];

/// Writes one CSV row per analyzed image, flushing after every row so that completed records survive a later failure.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RecordWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        Self::new(file)
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(HEADER)?;
        writer.flush().map_err(csv::Error::from)?;

        Ok(Self { writer })
    }

    pub fn write(&mut self, result: &AnalysisResult) -> Result<()> {
        let (ar, ag, ab) = result.avg_rgb();
        let (dr, dg, db) = result.dom_rgb();

        self.writer.write_record([
            result.filename().to_string(),
            result.avg_name().to_string(),
            ar.to_string(),
            ag.to_string(),
            ab.to_string(),
            result.dom_name().to_string(),
            dr.to_string(),
            dg.to_string(),
            db.to_string(),
        ])?;
        self.writer.flush().map_err(csv::Error::from)?;

        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Output(csv::Error::from(e.into_error())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_then_one_row_per_result() {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();

        writer
            .write(&AnalysisResult::new(
                "swatch.png",
                ("red", (127, 0, 127)),
                ("blue", (0, 0, 255)),
            ))
            .unwrap();

        let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            csv,
            "Image Filename,Avg Color Name,A_Red,A_Green,A_Blue,Dominant Color Name,D_Red,D_Green,D_Blue\n\
             swatch.png,red,127,0,127,blue,0,0,255\n"
        );
    }

    #[test]
    fn quotes_fields_containing_commas() {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();

        writer
            .write(&AnalysisResult::new("a,b.png", ("x", (1, 2, 3)), ("y", (4, 5, 6))))
            .unwrap();

        let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(csv.ends_with("\"a,b.png\",x,1,2,3,y,4,5,6\n"));
    }
}
