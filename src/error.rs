use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} lexical error(s) in block")]
    Lex(usize),
    #[error("{0} invalid line(s) in block")]
    Parse(usize),
}
