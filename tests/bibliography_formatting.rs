//! Characterization tests for citation formatting.
//!
//! These pin the exact strings the formatter produces for entries loaded the
//! way a render loads them (from BibTeX and JSON), so regressions in either
//! the readers or the formatter show up here.

mod common;

use distill_render::refs::parse_json_refs;
use distill_render::{
    bibliography_citation, bibtex, long_inline_citation, short_inline_citation, Data,
};

/// Helper: a Data context with the given BibTeX loaded and keys cited in order.
fn data_from_bibtex(bib: &str, cited: &[&str]) -> Data {
    let mut data = Data::with_bibliography(bibtex::parse_bibliography(bib).unwrap());
    for key in cited {
        data.add_citation(key);
    }
    data
}

#[test]
fn test_numbering_independent_of_bibliography_size() {
    // Given: twenty references, cited in reverse order
    let ids: Vec<String> = (0..20).map(|i| format!("ref{:02}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut data = Data::with_bibliography(parse_json_refs(&common::build_refs(&id_refs)).unwrap());
    for id in id_refs.iter().rev() {
        data.add_citation(id);
    }

    // Then: every key is numbered by its citation position
    for (position, id) in id_refs.iter().rev().enumerate() {
        assert_eq!(
            short_inline_citation(&[*id], &data).to_string(),
            format!("[{}]", position + 1),
            "wrong number for {}",
            id
        );
    }
}

#[test]
fn test_author_year_from_bibtex() {
    let data = data_from_bibtex(
        r#"
@article{pair, author = {Smith, J. and Doe, A.}, year = {2020}, title = {P}}
@article{crowd, author = {Smith, J. and Doe, A. and Roe, R.}, year = {2020}, title = {C}}
"#,
        &[],
    );

    assert_eq!(long_inline_citation(&["pair"], &data).to_string(), "Smith & Doe, 2020");
    assert_eq!(
        long_inline_citation(&["crowd"], &data).to_string(),
        "Smith, et al., 2020"
    );
    assert_eq!(
        long_inline_citation(&["pair", "crowd"], &data).to_string(),
        "Smith & Doe, 2020, Smith, et al., 2020"
    );
}

#[test]
fn test_full_entry_from_json() {
    // Given: the reference as a JSON record with numeric fields
    let refs = parse_json_refs(
        r#"[{"id": "s", "author": "Smith, John", "year": 2020, "title": "A Study",
             "journal": "J. Things", "volume": 5, "issue": "2", "pages": "10-20"}]"#,
    )
    .unwrap();

    // Then: the bibliography line matches exactly
    assert_eq!(
        bibliography_citation(refs.get("s")).to_string(),
        "Smith, J., 2020. A Study. J. Things, Vol 5(2), pp. 10-20. "
    );
}

#[test]
fn test_issue_preferred_over_number() {
    let data = data_from_bibtex(
        "@article{k, author={Doe, Jane}, year={2000}, title={T}, journal={J}, volume={3}, number={9}, issue={4}}",
        &["k"],
    );

    assert_eq!(
        bibliography_citation(data.entry("k")).to_string(),
        "Doe, J., 2000. T. J, Vol 3(4). "
    );
}

#[test]
fn test_bracing_and_whitespace_from_bibtex() {
    let data = data_from_bibtex(
        "@book{k, author = {van  der Berg,   Anna  Maria}, year = 1999, title = {{The}   Book}}",
        &["k"],
    );

    assert_eq!(
        bibliography_citation(data.entry("k")).to_string(),
        "van der Berg, A.M., 1999. The Book. . "
    );
}
