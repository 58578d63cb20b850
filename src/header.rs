use std::io::Write;

use indexmap::IndexMap;
use strum::Display;

use crate::session::{Query, Session};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum HeaderField {
    #[strum(serialize = "#GENRE")]
    Genre,
    #[strum(serialize = "#TITLE")]
    Title,
    #[strum(serialize = "#ARTIST")]
    Artist,
    #[strum(serialize = "#BPM")]
    Bpm,
    #[strum(serialize = "#WAV02")]
    Wav02,
}
impl From<Query> for HeaderField {
    fn from(query: Query) -> Self {
        match query {
            Query::Genre => Self::Genre,
            Query::Title => Self::Title,
            Query::Artist => Self::Artist,
            Query::Bpm => Self::Bpm,
        }
    }
}

pub type HeaderMap = IndexMap<HeaderField, String>;

pub const QUERIES: [Query; 4] = [Query::Genre, Query::Title, Query::Artist, Query::Bpm];
pub const SAMPLE_FILE_NAME: &str = "out.wav";

pub fn build_headers(session: &impl Session) -> anyhow::Result<HeaderMap> {
    let mut headers = QUERIES
        .into_iter()
        .map(|query| Ok((query.into(), session.evaluate(query)?)))
        .collect::<anyhow::Result<HeaderMap>>()?;
    headers.insert(HeaderField::Wav02, SAMPLE_FILE_NAME.to_owned());
    Ok(headers)
}

pub fn print_header_field(out: &mut impl Write, headers: &HeaderMap) -> anyhow::Result<()> {
    for (field, value) in headers {
        writeln!(out, "{field} {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::bail;

    use super::{build_headers, print_header_field, HeaderField, HeaderMap};
    use crate::session::{Query, Session};

    #[derive(Default)]
    struct FixedSession {
        calls: RefCell<Vec<Query>>,
        fail_on: Option<Query>,
    }
    impl Session for FixedSession {
        fn evaluate(&self, query: Query) -> anyhow::Result<String> {
            self.calls.borrow_mut().push(query);
            if self.fail_on == Some(query) {
                bail!("`{query}` is not defined");
            }
            Ok(match query {
                Query::Genre => "GENRE",
                Query::Title => "TITLE",
                Query::Artist => "ARTIST",
                Query::Bpm => "150",
            }
            .to_owned())
        }
    }

    #[test]
    fn reads_four_queries_in_order() {
        let session = FixedSession::default();
        let headers = build_headers(&session).unwrap();
        assert_eq!(
            headers.into_iter().collect::<Vec<_>>(),
            [
                (HeaderField::Genre, "GENRE".to_owned()),
                (HeaderField::Title, "TITLE".to_owned()),
                (HeaderField::Artist, "ARTIST".to_owned()),
                (HeaderField::Bpm, "150".to_owned()),
                (HeaderField::Wav02, "out.wav".to_owned()),
            ]
        );
        assert_eq!(
            *session.calls.borrow(),
            [Query::Genre, Query::Title, Query::Artist, Query::Bpm]
        );
    }

    #[test]
    fn evaluation_failure_stops_early() {
        let session = FixedSession {
            fail_on: Some(Query::Artist),
            ..Default::default()
        };
        let err = build_headers(&session).unwrap_err();
        assert_eq!(err.to_string(), "`artist` is not defined");
        assert_eq!(
            *session.calls.borrow(),
            [Query::Genre, Query::Title, Query::Artist]
        );
    }

    #[test]
    fn prints_one_line_per_field() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderField::Title, "fly so high".to_owned());
        headers.insert(HeaderField::Bpm, "180".to_owned());
        headers.insert(HeaderField::Wav02, "out.wav".to_owned());
        let mut out = vec![];
        print_header_field(&mut out, &headers).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#TITLE fly so high\n#BPM 180\n#WAV02 out.wav\n"
        );
    }
}
