use crate::config::{RangeMatch, StoreConfig};
use crate::dataset::Dataset;
use thiserror::Error;

/// Why a range delete was refused. The `Display` text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Start and End values must be integers.")]
    NotIntegers,
    #[error("Start and End values must be within {0} digits.")]
    OutOfDomain(usize),
    #[error("Start value must be smaller than End value.")]
    NotAscending,
    #[error("Start key couldn't be found.")]
    StartNotFound,
    #[error("End key couldn't be found.")]
    EndNotFound,
}

/// Parses both bounds and checks they fit the padded domain and ascend.
pub fn parse_bounds(start: &str, end: &str, config: &StoreConfig) -> Result<(u64, u64), RangeError> {
    let (start, end) = match (start.trim().parse::<i128>(), end.trim().parse::<i128>()) {
        (Ok(start), Ok(end)) => (start, end),
        _ => return Err(RangeError::NotIntegers),
    };

    let max = config.max_range_bound() as i128;
    let in_domain = |n: i128| (0..=max).contains(&n);
    if !in_domain(start) || !in_domain(end) {
        return Err(RangeError::OutOfDomain(config.pad_width));
    }

    if start >= end {
        return Err(RangeError::NotAscending);
    }

    Ok((start as u64, end as u64))
}

/// Zero-pads `n` to the configured width.
pub fn pad_index(n: u64, width: usize) -> String {
    format!("{:0width$}", n, width = width)
}

fn key_matches(key: &str, padded: &str, mode: RangeMatch) -> bool {
    match mode {
        RangeMatch::Substring => key.contains(padded),
        RangeMatch::LeadingIndex => {
            let digits = key.bytes().take_while(u8::is_ascii_digit).count();
            &key[..digits] == padded
        }
    }
}

/// Resolves the text bounds of a range delete to the keys it covers.
///
/// Each bound picks the first key (document order) that matches its padded
/// number. The batch is then every key between those two under plain string
/// ordering, which may be empty when substring matches land out of order.
pub fn resolve_range(
    dataset: &Dataset,
    start: &str,
    end: &str,
    config: &StoreConfig,
) -> Result<Vec<String>, RangeError> {
    let (start, end) = parse_bounds(start, end, config)?;
    let padded_start = pad_index(start, config.pad_width);
    let padded_end = pad_index(end, config.pad_width);

    let mut start_key = None;
    let mut end_key = None;
    for key in dataset.keys() {
        if start_key.is_none() && key_matches(key, &padded_start, config.range_match) {
            start_key = Some(key);
        }
        if end_key.is_none() && key_matches(key, &padded_end, config.range_match) {
            end_key = Some(key);
        }
        if start_key.is_some() && end_key.is_some() {
            break;
        }
    }

    let start_key = start_key.ok_or(RangeError::StartNotFound)?;
    let end_key = end_key.ok_or(RangeError::EndNotFound)?;

    Ok(dataset
        .keys()
        .filter(|key| start_key <= *key && *key <= end_key)
        .map(str::to_string)
        .collect())
}
