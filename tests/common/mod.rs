//! Shared test constants and helpers for integration tests.

/// A small v2 article: three citation markers, one unknown key, an embedded
/// BibTeX block and a bibliography placeholder.
///
/// Citation order by first appearance: olah2016, gregor2015, mercier2011,
/// unknown2020.
pub const ARTICLE: &str = r#"<!doctype html>
<html>
<head>
  <script src="https://distill.pub/template.v2.js"></script>
  <script type="text/bibliography">
    @article{gregor2015,
      title={DRAW: A recurrent neural network for image generation},
      author={Gregor, Karol and Danihelka, Ivo and Graves, Alex},
      journal={arXiv preprint arXiv:1502.04623},
      year={2015}
    }
    @article{olah2016,
      title={Attention and Augmented Recurrent Neural Networks},
      author={Olah, Chris and Carter, Shan},
      journal={Distill},
      volume={1},
      number={9},
      year={2016}
    }
    @inproceedings{mercier2011,
      title={Why do humans reason?},
      author={Mercier, Hugo},
      booktitle={Behavioral and Brain Sciences},
      pages={57--74},
      year={2011}
    }
  </script>
</head>
<body>
  <dt-article>
    <p>Attention <dt-cite key="olah2016"></dt-cite> helps generation
       <dt-cite key="gregor2015,olah2016"></dt-cite>.</p>
    <p>Reasoning <dt-cite key="mercier2011, unknown2020"></dt-cite>.</p>
  </dt-article>
  <dt-bibliography></dt-bibliography>
</body>
</html>
"#;

/// Expected bibliography lines for [`ARTICLE`], in citation order. The
/// unknown key is cited too, so it gets a placeholder line.
pub const ARTICLE_BIBLIOGRAPHY: [&str; 4] = [
    "Olah, C. and Carter, S., 2016. Attention and Augmented Recurrent Neural Networks. Distill, Vol 1(9). ",
    "Gregor, K., Danihelka, I. and Graves, A., 2015. DRAW: A recurrent neural network for image generation. arXiv preprint arXiv:1502.04623. ",
    "Mercier, H., 2011. Why do humans reason?. Behavioral and Brain Sciences, pp. 57--74. ",
    "?",
];

/// Build a JSON array of test references from a list of IDs.
///
/// Each reference gets an auto-generated author (`AuthorX, A.` where X is the
/// last char of the ID) and a title (`Title {id}`), all dated 2020.
pub fn build_refs(ids: &[&str]) -> String {
    let refs: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id": "{}", "author": "Author{}, A.", "title": "Title {}", "year": 2020}}"#,
                id,
                id.chars().last().unwrap_or('X'),
                id
            )
        })
        .collect();
    format!("[{}]", refs.join(", "))
}
