// RouterOS API wire format: length-prefixed words grouped into sentences

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::Record;
use crate::error::ClientError;

/// Words larger than this are treated as a protocol violation
const MAX_WORD_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyKind {
    Re,
    Done,
    Trap,
    Fatal,
    Empty,
}

/// A decoded reply sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub attributes: Record,
    /// Bare words that are not `=key=value` attributes (e.g. the `!fatal` reason)
    pub words: Vec<String>,
}

impl Reply {
    pub fn message(&self) -> String {
        self.attributes
            .get("message")
            .cloned()
            .or_else(|| self.words.first().cloned())
            .unwrap_or_default()
    }
}

/// Encode a word length using the variable-length prefix
pub fn encode_length(len: usize) -> Vec<u8> {
    let len = len as u32;
    if len < 0x80 {
        vec![len as u8]
    } else if len < 0x4000 {
        ((len | 0x8000) as u16).to_be_bytes().to_vec()
    } else if len < 0x20_0000 {
        (len | 0xC0_0000).to_be_bytes()[1..].to_vec()
    } else if len < 0x1000_0000 {
        (len | 0xE000_0000).to_be_bytes().to_vec()
    } else {
        let mut out = vec![0xF0];
        out.extend_from_slice(&len.to_be_bytes());
        out
    }
}

pub async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> Result<usize, ClientError> {
    let first = reader.read_u8().await?;

    let (initial, extra) = if first & 0x80 == 0 {
        (first as u32, 0)
    } else if first & 0xC0 == 0x80 {
        ((first & 0x3F) as u32, 1)
    } else if first & 0xE0 == 0xC0 {
        ((first & 0x1F) as u32, 2)
    } else if first & 0xF0 == 0xE0 {
        ((first & 0x0F) as u32, 3)
    } else if first == 0xF0 {
        (0, 4)
    } else {
        return Err(ClientError::Protocol(format!(
            "unsupported length prefix 0x{:02x}",
            first
        )));
    };

    let mut len = initial;
    for _ in 0..extra {
        len = (len << 8) | reader.read_u8().await? as u32;
    }

    Ok(len as usize)
}

pub async fn read_word<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, ClientError> {
    let len = read_length(reader).await?;
    if len > MAX_WORD_LEN {
        return Err(ClientError::Protocol(format!("word of {} bytes exceeds limit", len)));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;

    String::from_utf8(buf).map_err(|e| ClientError::Protocol(format!("word is not UTF-8: {}", e)))
}

/// Read words until the zero-length terminator
pub async fn read_sentence<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<String>, ClientError> {
    let mut words = Vec::new();
    loop {
        let word = read_word(reader).await?;
        if word.is_empty() {
            return Ok(words);
        }
        words.push(word);
    }
}

pub async fn write_sentence<W, S>(writer: &mut W, words: &[S]) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
    S: AsRef<str>,
{
    let mut buf = Vec::new();
    for word in words {
        let word = word.as_ref().as_bytes();
        buf.extend_from_slice(&encode_length(word.len()));
        buf.extend_from_slice(word);
    }
    buf.push(0);

    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Split `=key=value` into its parts. The value may itself contain `=`.
fn parse_attribute(word: &str) -> Option<(&str, &str)> {
    word.strip_prefix('=')?.split_once('=')
}

pub fn parse_reply(sentence: Vec<String>) -> Result<Reply, ClientError> {
    let mut words = sentence.into_iter();

    let kind = match words.next().as_deref() {
        Some("!re") => ReplyKind::Re,
        Some("!done") => ReplyKind::Done,
        Some("!trap") => ReplyKind::Trap,
        Some("!fatal") => ReplyKind::Fatal,
        Some("!empty") => ReplyKind::Empty,
        Some(other) => {
            return Err(ClientError::Protocol(format!("unexpected reply word {:?}", other)));
        }
        None => return Err(ClientError::Protocol("empty sentence".to_string())),
    };

    let mut attributes = Record::new();
    let mut bare = Vec::new();
    for word in words {
        match parse_attribute(&word) {
            Some((key, value)) => {
                attributes.insert(key.to_string(), value.to_string());
            }
            // `.tag=` and other API words carry nothing we use
            None if word.starts_with('.') => {}
            None => bare.push(word),
        }
    }

    Ok(Reply {
        kind,
        attributes,
        words: bare,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_length_boundaries() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(0x7F), vec![0x7F]);
        assert_eq!(encode_length(0x80), vec![0x80, 0x80]);
        assert_eq!(encode_length(0x3FFF), vec![0xBF, 0xFF]);
        assert_eq!(encode_length(0x4000), vec![0xC0, 0x40, 0x00]);
        assert_eq!(encode_length(0x20_0000), vec![0xE0, 0x20, 0x00, 0x00]);
        assert_eq!(encode_length(0x1000_0000), vec![0xF0, 0x10, 0x00, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn test_read_length_multi_byte() {
        let mut input: &[u8] = &[0xC0, 0x40, 0x00];
        assert_eq!(read_length(&mut input).await.unwrap(), 0x4000);

        let mut input: &[u8] = &[0x81, 0x2C];
        assert_eq!(read_length(&mut input).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_read_length_rejects_reserved_prefix() {
        let mut input: &[u8] = &[0xF8];
        assert!(matches!(read_length(&mut input).await, Err(ClientError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_sentence_over_buffer() {
        let mut buf = Vec::new();
        write_sentence(&mut buf, &["/system/identity/print", "=.proplist=name"])
            .await
            .unwrap();
        assert_eq!(buf.last(), Some(&0));

        let mut reader = buf.as_slice();
        let words = read_sentence(&mut reader).await.unwrap();
        assert_eq!(words, vec!["/system/identity/print", "=.proplist=name"]);
    }

    #[tokio::test]
    async fn test_truncated_sentence_is_io_error() {
        let mut input: &[u8] = &[0x05, b'!', b'd'];
        assert!(matches!(read_sentence(&mut input).await, Err(ClientError::Io(_))));
    }

    #[test]
    fn test_parse_reply_attributes() {
        let reply = parse_reply(vec![
            "!re".to_string(),
            "=name=core-rtr1".to_string(),
            "=comment=a=b".to_string(),
            "=disabled=".to_string(),
            ".tag=7".to_string(),
        ])
        .unwrap();

        assert_eq!(reply.kind, ReplyKind::Re);
        assert_eq!(reply.attributes["name"], "core-rtr1");
        assert_eq!(reply.attributes["comment"], "a=b");
        assert_eq!(reply.attributes["disabled"], "");
        assert!(reply.words.is_empty());
    }

    #[test]
    fn test_parse_reply_fatal_message() {
        let reply = parse_reply(vec!["!fatal".to_string(), "session terminated".to_string()]).unwrap();
        assert_eq!(reply.kind, ReplyKind::Fatal);
        assert_eq!(reply.message(), "session terminated");
    }

    #[test]
    fn test_parse_reply_unknown_word() {
        assert!(parse_reply(vec!["!bogus".to_string()]).is_err());
        assert!(parse_reply(vec![]).is_err());
    }
}
