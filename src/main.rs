use std::io::{self, BufWriter};

use clap::Parser;
use log::info;
use textage2bms::{pipeline, session::ChromeDriver};
use url::Url;

#[derive(Parser)]
#[command(about = "Converts a Textage score page into a BMS chart on stdout")]
struct Opts {
    /// Score page to convert
    url: Url,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    let mut out = BufWriter::new(io::stdout().lock());
    pipeline::run(ChromeDriver::launch, &opts.url, &mut out)?;
    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, Parser};

    use super::Opts;

    #[test]
    fn url_is_required() {
        let err = Opts::try_parse_from(["textage2bms"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn url_must_be_valid() {
        assert!(Opts::try_parse_from(["textage2bms", "not a url"]).is_err());
        assert!(Opts::try_parse_from(["textage2bms", "https://a.example", "extra"]).is_err());
    }

    #[test]
    fn accepts_single_url() {
        let opts =
            Opts::try_parse_from(["textage2bms", "https://textage.cc/score/7/a_amuro.html?1AC00"])
                .unwrap();
        assert_eq!(opts.url.host_str(), Some("textage.cc"));
    }
}
