use crate::metadata::PhotoMetadata;
use crate::sanitize::sanitize_filename;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// Renamed files always get this extension, whatever the source carried.
pub const TARGET_EXTENSION: &str = "jpg";

pub fn target_filename(base: &str) -> String {
    format!("{base}.{TARGET_EXTENSION}")
}

pub fn build_base_name(metadata: &PhotoMetadata) -> String {
    let mut joined = metadata.taken_at.format(TIMESTAMP_FORMAT).to_string();
    for field in metadata.name_fields() {
        joined.push(' ');
        joined.push_str(field);
    }

    let replaced = joined.replace(':', "-").replace('/', "");
    sanitize_filename(&remove_repeated_words(&replaced))
}

fn remove_repeated_words(value: &str) -> String {
    let mut words = Vec::<&str>::new();
    for word in value.split_whitespace() {
        if !words.contains(&word) {
            words.push(word);
        }
    }
    words.join(" ")
}
