use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const SAMPLE_FILE_NAME: &str = "exoplanet_sample.csv";

pub const SAMPLE_HEADER: [&str; 5] = [
    "ID",
    "Candidate Name",
    "Planet Mass (M_Jup)",
    "Orbit Period (days)",
    "Detection Method",
];

const SAMPLE_ROWS: [[&str; 5]; 5] = [
    ["1", "Kepler-22b", "0.11", "289.86", "Transit"],
    ["2", "TOI-700 d", "0.006", "37.42", "Transit"],
    ["3", "K2-18b", "0.027", "32.94", "Transit"],
    ["4", "51 Pegasi b", "0.46", "4.23", "Radial Velocity"],
    ["5", "HR 8799 e", "7.0", "16425.0", "Direct Imaging"],
];

/// Write the example candidate table to any writer.
pub fn write_sample<W: Write>(writer: W) -> csv::Result<()> {
    let mut out = WriterBuilder::new().from_writer(writer);
    out.write_record(SAMPLE_HEADER)?;
    for row in SAMPLE_ROWS.iter() {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_sample_file(path: &Path) -> csv::Result<()> {
    let file = File::create(path)?;
    write_sample(file)?;
    log::info!("wrote sample dataset to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;
    use tempfile::tempdir;

    #[test]
    fn sample_has_expected_header_and_rows() {
        let mut buf = Vec::new();
        write_sample(&mut buf).unwrap();
        let mut reader = ReaderBuilder::new().from_reader(buf.as_slice());
        let headers: Vec<_> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, SAMPLE_HEADER);
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), SAMPLE_ROWS.len());
        assert_eq!(&rows[0][1], "Kepler-22b");
    }

    #[test]
    fn sample_file_is_a_csv_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SAMPLE_FILE_NAME);
        write_sample_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "ID,Candidate Name,Planet Mass (M_Jup),Orbit Period (days),Detection Method\n"
        ));
    }
}
