//! Common I/O code using sync I/O.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, StdoutLock, Write},
    path::Path,
};

use anyhow::Context;
use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Path that selects stdin (for reading) or stdout (for writing).
pub const STDIO_PATH: &str = "-";

/// Returns whether the path looks like a gzip or bgzip file.
pub fn is_gz<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    [Some(Some("gz")), Some(Some("bgz"))].contains(&path.as_ref().extension().map(|s| s.to_str()))
}

/// Transparently open a plain, gzip, or bgzip file for reading.
///
/// Note that decoding of multi-member gzip files is automatically supported, as is needed for
/// `bgzip` files.  The path `-` selects standard input, which is always read as plain text.
///
/// # Arguments
///
/// * `path` - A path to the file to open.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref() == Path::new(STDIO_PATH) {
        tracing::trace!("Reading from stdin");
        Ok(Box::new(std::io::stdin().lock()))
    } else if is_gz(path.as_ref()) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path.as_ref())
            .with_context(|| format!("could not open {:?}", path.as_ref()))?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path.as_ref())
            .with_context(|| format!("could not open {:?}", path.as_ref()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output stream returned by `open_write_maybe_gz`.
///
/// Close with `finish()`; errors while flushing on drop are ignored.
pub enum OutputWriter {
    Stdout(BufWriter<StdoutLock<'static>>),
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl OutputWriter {
    /// Flush all buffered data and, for gzip output, write the gzip trailer.
    pub fn finish(self) -> Result<(), anyhow::Error> {
        match self {
            OutputWriter::Stdout(mut writer) => writer.flush().context("could not flush stdout"),
            OutputWriter::Plain(mut writer) => writer.flush().context("could not flush output"),
            OutputWriter::Gz(encoder) => {
                let mut writer = encoder
                    .finish()
                    .context("could not finish gzip output")?;
                writer.flush().context("could not flush gzip output")
            }
        }
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            OutputWriter::Stdout(writer) => writer.write(buf),
            OutputWriter::Plain(writer) => writer.write(buf),
            OutputWriter::Gz(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            OutputWriter::Stdout(writer) => writer.flush(),
            OutputWriter::Plain(writer) => writer.flush(),
            OutputWriter::Gz(writer) => writer.flush(),
        }
    }
}

/// Transparently open stdout, a plain file, or a gzip file for writing.
///
/// # Arguments
///
/// * `path` - A path to the file to open, `None` or `-` for stdout.
pub fn open_write_maybe_gz<P>(path: Option<P>) -> Result<OutputWriter, anyhow::Error>
where
    P: AsRef<Path>,
{
    match path {
        Some(path) if path.as_ref() != Path::new(STDIO_PATH) => {
            let file = File::create(path.as_ref())
                .with_context(|| format!("could not create {:?}", path.as_ref()))?;
            if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
                tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
                let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
                Ok(OutputWriter::Gz(encoder))
            } else {
                tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
                Ok(OutputWriter::Plain(BufWriter::new(file)))
            }
        }
        _ => {
            tracing::trace!("Writing to stdout");
            Ok(OutputWriter::Stdout(BufWriter::new(std::io::stdout().lock())))
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::{Read, Write};

    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case("x.vcf", false)]
    #[case("x.vcf.gz", true)]
    #[case("x.vcf.bgz", true)]
    #[case("x.gz.vcf", false)]
    #[case("-", false)]
    fn is_gz(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(super::is_gz(path), expected);
    }

    #[rstest::rstest]
    #[case("minimal.vcf")]
    #[case("minimal.vcf.gz")]
    fn open_read_maybe_gz(#[case] path: &str) -> Result<(), anyhow::Error> {
        let mut reader = super::open_read_maybe_gz(format!("tests/data/flatten/{}", path))?;
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;

        assert!(buf.starts_with("##fileformat=VCFv4.2\n"));
        assert!(buf.contains("#CHROM\tPOS\tID"));

        Ok(())
    }

    #[test]
    fn open_read_maybe_gz_missing_file() {
        let res = super::open_read_maybe_gz("tests/data/flatten/does-not-exist.vcf");

        assert!(res.is_err());
    }

    #[rstest::rstest]
    #[case("out.tsv")]
    #[case("out.tsv.gz")]
    fn open_write_maybe_gz(#[case] filename: &str) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let tmp_file_path = tmp_dir.join(filename);

        let mut writer = super::open_write_maybe_gz(Some(&tmp_file_path))?;
        for i in 1..3000 {
            writer.write_all(format!("{}\n", i).as_bytes())?;
        }
        writer.finish()?;

        let mut buf = String::new();
        super::open_read_maybe_gz(&tmp_file_path)?.read_to_string(&mut buf)?;
        assert_eq!(buf.lines().count(), 2999);
        assert_eq!(buf.lines().last(), Some("2999"));

        Ok(())
    }

    #[test]
    fn open_write_maybe_gz_finish_writes_trailer() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let tmp_file_path = tmp_dir.join("out.tsv.gz");

        let mut writer = super::open_write_maybe_gz(Some(&tmp_file_path))?;
        assert!(matches!(writer, super::OutputWriter::Gz(_)));
        writer.write_all(b"CHROM\tPOS\n")?;
        writer.finish()?;

        // The gzip trailer holds the CRC32 and the uncompressed size (ISIZE) of the member.
        let bytes = std::fs::read(&tmp_file_path)?;
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        let isize = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into()?);
        assert_eq!(isize, 10);

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(bytes.as_slice()).read_to_string(&mut decoded)?;
        assert_eq!(decoded, "CHROM\tPOS\n");

        Ok(())
    }

    #[rstest::rstest]
    #[case(None, "stdout")]
    #[case(Some("-"), "stdout")]
    #[case(Some("out.tsv"), "plain")]
    fn open_write_maybe_gz_kind(
        #[case] filename: Option<&str>,
        #[case] expected: &str,
    ) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = filename.map(|name| {
            if name == super::STDIO_PATH {
                std::path::PathBuf::from(name)
            } else {
                tmp_dir.join(name)
            }
        });

        let writer = super::open_write_maybe_gz(path.as_ref())?;
        let kind = match &writer {
            super::OutputWriter::Stdout(_) => "stdout",
            super::OutputWriter::Plain(_) => "plain",
            super::OutputWriter::Gz(_) => "gz",
        };
        writer.finish()?;

        assert_eq!(kind, expected);

        Ok(())
    }
}
