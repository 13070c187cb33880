use failure::Error;
use std::path::Path;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum OutputFormat {
    Text,
    TextGz,
    JsonStream,
    JsonStreamGz,
}

static SUFFIXES: [(&str, OutputFormat); 4] = [
    (".jsonl.gz", OutputFormat::JsonStreamGz),
    (".txt.gz", OutputFormat::TextGz),
    (".jsonl", OutputFormat::JsonStream),
    (".txt", OutputFormat::Text),
];

impl OutputFormat {
    /// Format of the output file, deduced from its suffix
    pub fn from_filename(filename: impl AsRef<Path>) -> Result<OutputFormat, Error> {
        let path = filename.as_ref();
        let name = path.file_name().and_then(|f| f.to_str()).unwrap_or("");
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
            .map(|(_, format)| *format)
            .ok_or_else(|| {
                let accepted = SUFFIXES
                    .iter()
                    .rev()
                    .map(|(suffix, _)| *suffix)
                    .collect::<Vec<_>>()
                    .join(", ");
                failure::err_msg(format!(
                    "Unable to detect the output format of '{}', \
                     the file name should end with one of: {}",
                    path.display(),
                    accepted
                ))
            })
    }

    /// Without an output file the postcodes are written as plain text
    pub fn from_output(output: Option<&Path>) -> Result<OutputFormat, Error> {
        output.map_or(Ok(OutputFormat::Text), |o| OutputFormat::from_filename(o))
    }

    pub fn is_compressed(self) -> bool {
        match self {
            OutputFormat::TextGz | OutputFormat::JsonStreamGz => true,
            OutputFormat::Text | OutputFormat::JsonStream => false,
        }
    }

    pub fn is_json_stream(self) -> bool {
        match self {
            OutputFormat::JsonStream | OutputFormat::JsonStreamGz => true,
            OutputFormat::Text | OutputFormat::TextGz => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::OutputFormat;
    use std::path::Path;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            OutputFormat::from_filename("postcodes.txt").unwrap(),
            OutputFormat::Text
        );
        assert_eq!(
            OutputFormat::from_filename("/tmp/postcodes.txt.gz").unwrap(),
            OutputFormat::TextGz
        );
        assert_eq!(
            OutputFormat::from_filename("postcodes.jsonl").unwrap(),
            OutputFormat::JsonStream
        );
        assert_eq!(
            OutputFormat::from_filename("out/pl.jsonl.gz").unwrap(),
            OutputFormat::JsonStreamGz
        );
    }

    #[test]
    fn stdout_is_text() {
        assert_eq!(OutputFormat::from_output(None).unwrap(), OutputFormat::Text);
        assert_eq!(
            OutputFormat::from_output(Some(Path::new("pl.jsonl"))).unwrap(),
            OutputFormat::JsonStream
        );
        assert!(OutputFormat::from_output(Some(Path::new("pl.csv"))).is_err());
    }

    #[test]
    fn format_properties() {
        assert!(OutputFormat::TextGz.is_compressed());
        assert!(!OutputFormat::JsonStream.is_compressed());
        assert!(OutputFormat::JsonStreamGz.is_json_stream());
        assert!(!OutputFormat::TextGz.is_json_stream());
    }

    #[test]
    fn unknown_extension() {
        let err = OutputFormat::from_filename("postcodes.csv").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to detect the output format of 'postcodes.csv', \
             the file name should end with one of: .txt, .jsonl, .txt.gz, .jsonl.gz"
        );
        // a bare suffix is not a file name
        assert!(OutputFormat::from_filename(".txt").is_err());
    }
}
