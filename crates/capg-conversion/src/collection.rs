//! Element-wise conversion of ordered and keyed collections.
//!
//! Both converters produce exactly one output element per input element, keep
//! the input order (or key) and stop at the first element which fails to
//! convert. A partially converted collection is never returned.

use std::collections::BTreeMap;

use snafu::ResultExt;

use crate::error::{ConvertElementSnafu, ConvertEntrySnafu, Result};

/// Converts every element of `input` with `convert`, placing the output of the
/// i-th element at position i.
///
/// `input` can be anything iterable with a known length, like `&Vec<T>` to
/// convert by reference or `Vec<T>` to consume the elements. The error of the
/// first failing element is returned wrapped with its index.
pub fn convert_all<I, O, F>(collection: &'static str, input: I, mut convert: F) -> Result<Vec<O>>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(I::Item) -> Result<O>,
{
    let input = input.into_iter();
    let mut output = Vec::with_capacity(input.len());

    for (index, element) in input.enumerate() {
        let converted = convert(element).context(ConvertElementSnafu { collection, index })?;
        output.push(converted);
    }

    Ok(output)
}

/// Converts every value of `input` with `convert`, keeping its key.
pub fn convert_map<K, I, O, F>(
    collection: &'static str,
    input: &BTreeMap<K, I>,
    mut convert: F,
) -> Result<BTreeMap<K, O>>
where
    K: Clone + Ord + ToString,
    F: FnMut(&I) -> Result<O>,
{
    input
        .iter()
        .map(|(key, value)| {
            let converted = convert(value).context(ConvertEntrySnafu {
                collection,
                key: key.to_string(),
            })?;
            Ok((key.clone(), converted))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::{ConversionFailedSnafu, Error, ErrorKind};

    #[derive(Clone, Debug, PartialEq)]
    struct Tagged {
        marker: String,
    }

    fn tag(input: &Tagged) -> Result<Tagged> {
        if input.marker.is_empty() {
            return ConversionFailedSnafu {
                entity: "Tagged",
                reason: "marker must not be empty",
            }
            .fail();
        }

        Ok(Tagged {
            marker: format!("converted-{}", input.marker),
        })
    }

    fn tagged(markers: &[&str]) -> Vec<Tagged> {
        markers
            .iter()
            .map(|marker| Tagged {
                marker: (*marker).to_owned(),
            })
            .collect()
    }

    #[rstest]
    #[case(&[])]
    #[case(&["a"])]
    #[case(&["a", "b", "c"])]
    #[case(&["z", "y", "x", "w", "v", "u"])]
    fn keeps_length_and_order(#[case] markers: &[&str]) {
        let input = tagged(markers);
        let output = convert_all("tagged", &input, tag).expect("all elements are valid");

        assert_eq!(output.len(), input.len());
        for (input, output) in input.iter().zip(&output) {
            assert_eq!(output.marker, format!("converted-{}", input.marker));
        }
    }

    #[test]
    fn output_does_not_alias_input() {
        let input = tagged(&["a", "b"]);
        let mut output = convert_all("tagged", &input, |element: &Tagged| Ok(element.clone()))
            .expect("cloning never fails");

        output[0].marker.push_str("-mutated");
        assert_eq!(input, tagged(&["a", "b"]));
    }

    #[rstest]
    #[case(&["", "b", "c"], 0)]
    #[case(&["a", "", "c"], 1)]
    #[case(&["a", "b", ""], 2)]
    fn fails_fast(#[case] markers: &[&str], #[case] failing_index: usize) {
        let input = tagged(markers);
        let mut calls = 0;

        let err = convert_all("tagged", &input, |element| {
            calls += 1;
            tag(element)
        })
        .expect_err("one element is malformed");

        assert_eq!(calls, failing_index + 1);
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert!(matches!(
            err,
            Error::ConvertElement { index, collection: "tagged", .. } if index == failing_index
        ));
    }

    #[test]
    fn consumes_owned_input() {
        let output = convert_all("numbers", vec![1, 2, 3], |number: i32| Ok(number * 10))
            .expect("multiplication never fails");
        assert_eq!(output, [10, 20, 30]);
    }

    #[test]
    fn keyed_collections_keep_keys() {
        let input = BTreeMap::from([
            ("us-central1-a".to_owned(), Tagged {
                marker: "a".to_owned(),
            }),
            ("us-central1-b".to_owned(), Tagged {
                marker: "b".to_owned(),
            }),
        ]);

        let output = convert_map("failureDomains", &input, tag).expect("all entries are valid");
        assert_eq!(output.len(), 2);
        assert_eq!(output["us-central1-a"].marker, "converted-a");
        assert_eq!(output["us-central1-b"].marker, "converted-b");
    }

    #[test]
    fn keyed_collections_fail_with_key() {
        let input = BTreeMap::from([("broken".to_owned(), Tagged {
            marker: String::new(),
        })]);

        let err = convert_map("failureDomains", &input, tag).expect_err("entry is malformed");
        assert!(matches!(err, Error::ConvertEntry { ref key, .. } if key == "broken"));
    }
}
