use mform_domain::FormData;

/// Projects `data` onto a subset of its keys.
///
/// A non-empty `pick` keeps only those keys; `omit` is then removed from
/// whatever is left. `data` is not modified.
pub fn select_keys<S: AsRef<str>>(data: &FormData, pick: &[S], omit: &[S]) -> FormData {
    data.iter()
        .filter(|(key, _)| pick.is_empty() || pick.iter().any(|picked| picked.as_ref() == *key))
        .filter(|(key, _)| !omit.iter().any(|omitted| omitted.as_ref() == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
