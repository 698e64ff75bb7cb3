/// Attribution of a data source, typically displayed in a corner of the map.
#[derive(Debug, Clone)]
pub struct Attribution {
    /// Attribution text, e.g. a copyright notice required by the tile provider.
    pub text: &'static str,
    /// An optional URL with details about the data source.
    pub url: Option<&'static str>,
}

impl Attribution {
    /// Creates a new `Attribution` with the given text and optional URL.
    pub fn new(text: &'static str, url: Option<&'static str>) -> Self {
        Self { text, url }
    }
}
