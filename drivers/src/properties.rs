use crate::types;

#[derive(Debug, serde::Serialize)]
pub struct Deserializer {
    pub name: &'static str,
    pub links: &'static [types::Link],
    pub default_format: types::Format,
    pub default_sub_streams: &'static [types::SubStream],
    pub link_frequencies: &'static [i64],
}

impl Deserializer {
    pub fn source_pad(&self) -> usize {
        self.links.len()
    }
}
