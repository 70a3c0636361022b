pub mod mealdb;
#[cfg(test)]
pub mod memory;
pub mod restcountries;
pub mod store;

/// Clip upstream bodies before they land in error messages and logs.
pub(crate) fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}
