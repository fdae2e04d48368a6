use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when a container's identity is encountered twice during one
    /// encode call, whether through a true cycle or shared substructure.
    Cycle,
    /// Occurs when a value matches none of the recognized primitive,
    /// container, tag, or host-capability shapes.
    Unencodable(String),
    /// Occurs when a tag is built from an invalid argument, such as a
    /// timestamp string that fails to parse.
    BadTag(String),
    /// Occurs when a chain of representation overrides exceeds the configured
    /// substitution limit.
    SubstitutionLimit { max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Cycle => f.write_str("object contained cycle"),
            Error::Unencodable(ref err) => write!(f, "cannot encode: {}", err),
            Error::BadTag(ref err) => write!(f, "bad tag: {}", err),
            Error::SubstitutionLimit { max } => write!(
                f,
                "representation overrides exceeded the substitution limit of {}",
                max
            ),
        }
    }
}

impl std::error::Error for Error {}
