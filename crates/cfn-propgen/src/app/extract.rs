//! Fact extraction from documentation pages.
//!
//! The extraction core is pure (`&str -> facts`); file reading and result
//! accumulation are thin wrappers around it so the scans stay unit-testable
//! against literal text fixtures.

use std::fs;
use std::path::Path;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::scan::{PageFile, ScanResult};
use crate::domain::errors::ExtractError;
use crate::domain::model::{DocumentationPage, ExtractedFacts, ResultSet};

/// Anchor suffix marking an attribute entry in the `Fn::GetAtt` section.
const GETATT_MARKER: &str = "-fn::getatt";

/// Sentence identifying the canonical `Ref` description in a `### Ref`
/// section.
const REF_SENTENCE: &str = "logical ID of this resource to the intrinsic `Ref` function";

static REF_RETURNS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`Ref` returns\s*([^\\,]+)").expect("valid Ref-returns regex"));

static BANG_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!Ref\s+([A-Za-z0-9]+)").expect("valid !Ref regex"));

/// Read and decode one discovered page.
///
/// Failures here are page-local: the caller logs them and moves on to the
/// remaining pages.
pub fn read_page(file: &PageFile) -> Result<DocumentationPage, ExtractError> {
    let bytes = fs::read(&file.path).map_err(|source| ExtractError::PageUnreadable {
        path: file.path.clone(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ExtractError::PageNotText {
        path: file.path.clone(),
    })?;

    let id = page_identifier(&text).unwrap_or_else(|| file_stem(&file.path));

    Ok(DocumentationPage {
        id,
        source: file.path.clone(),
        text,
    })
}

/// Apply both pattern scans to a page. Pages with no recognizable markers
/// produce empty sequences, never an error.
pub fn extract_page(page: &DocumentationPage) -> ExtractedFacts {
    ExtractedFacts {
        get_att_targets: getatt_targets(&page.text),
        ref_values: ref_values(&page.text),
    }
}

/// Drive extraction over every discovered page, accumulating a [`ResultSet`].
///
/// Unreadable pages are skipped with a warning; duplicate page identifiers
/// keep their first occurrence, which is deterministic because the scan
/// result is sorted.
pub fn extract_all(scan: &ScanResult) -> Result<ResultSet> {
    let mut results = ResultSet::new();

    for file in &scan.pages {
        let page = match read_page(file) {
            Ok(page) => page,
            Err(err) if err.is_page_local() => {
                tracing::warn!(page = %file.display_path, error = %err, "skipping page");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let facts = extract_page(&page);
        if !results.insert(page.id.clone(), facts) {
            tracing::warn!(
                page = %file.display_path,
                id = %page.id,
                "duplicate page identifier, keeping first occurrence"
            );
        }
    }

    Ok(results)
}

/// Derive the page identifier from its top-level heading.
///
/// Headings look like `# AWS::S3::Bucket<a name="..."></a>`: the identifier
/// is whatever follows the first `#`, up to the anchor.
fn page_identifier(text: &str) -> Option<String> {
    let first = text.lines().next()?;
    let after_hash = first.splitn(2, '#').nth(1)?;
    let name = after_hash.split('<').next().unwrap_or(after_hash).trim();
    (!name.is_empty()).then(|| name.to_owned())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Collect `Fn::GetAtt` attribute names.
///
/// An attribute entry is a line whose anchor carries the `-fn::getatt`
/// suffix and whose leading token is the backticked attribute name. The
/// section heading carries the same anchor suffix but no backticked token,
/// so it is not an attribute.
fn getatt_targets(text: &str) -> Vec<String> {
    let mut targets = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || !line.contains(GETATT_MARKER) {
            continue;
        }

        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        if !token.starts_with('`') {
            continue;
        }

        let name = token.trim_matches('`');
        if !name.is_empty() {
            push_unique(&mut targets, name.to_owned());
        }
    }
    targets
}

/// Collect `Ref` values mentioned in prose. Heuristic and best-effort: the
/// upstream pages describe `Ref` in free text, so anything unrecognized
/// degrades to an empty result rather than an error.
///
/// Two recognizers run over the page in document order:
/// 1. inside a `### Ref` section, the canonical "`Ref` returns ..." sentence;
/// 2. anywhere, `!Ref LogicalId` mentions.
fn ref_values(text: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut in_ref_section = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("### Ref") {
            in_ref_section = true;
        } else if line.starts_with("### Fn::GetAtt") {
            in_ref_section = false;
        }

        if in_ref_section
            && line.contains(REF_SENTENCE)
            && let Some(captures) = REF_RETURNS_RE.captures(line)
        {
            let value = clean_ref_value(&captures[1]);
            if !value.is_empty() {
                push_unique(&mut values, value);
            }
        }

        for captures in BANG_REF_RE.captures_iter(line) {
            push_unique(&mut values, captures[1].to_owned());
        }
    }

    values
}

fn clean_ref_value(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('.')
        .trim()
        .trim_matches('`')
        .to_owned()
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.iter().any(|existing| existing == &value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use crate::app::scan::{Scanner, ScannerConfig};
    use crate::infra::config::Config;

    fn page(text: &str) -> DocumentationPage {
        DocumentationPage {
            id: "test".into(),
            source: PathBuf::from("test.md"),
            text: text.into(),
        }
    }

    const S3_PAGE: &str = r#"# AWS::S3::Bucket<a name="aws-properties-s3-bucket"></a>

The `AWS::S3::Bucket` resource creates an Amazon S3 bucket\.

## Return values<a name="aws-properties-s3-bucket-return-values"></a>

### Ref<a name="aws-properties-s3-bucket-ref"></a>

When you pass the logical ID of this resource to the intrinsic `Ref` function, `Ref` returns the bucket name\.

### Fn::GetAtt<a name="aws-properties-s3-bucket-fn::getatt"></a>

`Arn`  <a name="Arn-fn::getatt"></a>
Returns the Amazon Resource Name \(ARN\) of the specified bucket\.

`DomainName`  <a name="DomainName-fn::getatt"></a>
Returns the IPv4 DNS name of the specified bucket\.
"#;

    #[test]
    fn extracts_getatt_targets_in_document_order() {
        let facts = extract_page(&page(S3_PAGE));
        assert_eq!(facts.get_att_targets, vec!["Arn", "DomainName"]);
    }

    #[test]
    fn section_heading_is_not_an_attribute() {
        let facts = extract_page(&page(S3_PAGE));
        assert!(!facts.get_att_targets.iter().any(|t| t.contains('#')));
    }

    #[test]
    fn extracts_ref_returns_sentence() {
        let facts = extract_page(&page(S3_PAGE));
        assert_eq!(facts.ref_values, vec!["the bucket name"]);
    }

    #[test]
    fn ref_sentence_outside_ref_section_is_ignored() {
        let text = "# AWS::Fake::Resource\n\
            When you pass the logical ID of this resource to the intrinsic `Ref` function, `Ref` returns nothing\\.\n";
        let facts = extract_page(&page(text));
        assert!(facts.ref_values.is_empty());
    }

    #[test]
    fn extracts_bang_ref_mentions_from_prose() {
        let text = "# AWS::S3::BucketPolicy\n\
            Attach the policy with `!Ref MyBucket` in the template\\.\n\
            You can also write !Ref MyBucket again, or !Ref OtherBucket\\.\n";
        let facts = extract_page(&page(text));
        assert_eq!(facts.ref_values, vec!["MyBucket", "OtherBucket"]);
    }

    #[test]
    fn page_with_no_markers_yields_empty_facts() {
        let facts = extract_page(&page("# AWS::EC2::Instance\n\nJust prose here\\.\n"));
        assert!(facts.is_empty());
        assert!(facts.get_att_targets.is_empty());
        assert!(facts.ref_values.is_empty());
    }

    #[test]
    fn getatt_targets_are_deduplicated() {
        let text = "# AWS::Fake::Resource\n\
            `Arn`  <a name=\"Arn-fn::getatt\"></a>\n\
            `Arn`  <a name=\"Arn-fn::getatt\"></a>\n";
        let facts = extract_page(&page(text));
        assert_eq!(facts.get_att_targets, vec!["Arn"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let doc = page(S3_PAGE);
        assert_eq!(extract_page(&doc), extract_page(&doc));
    }

    #[test]
    fn identifier_comes_from_heading() {
        assert_eq!(
            page_identifier("# AWS::S3::Bucket<a name=\"x\"></a>\nbody"),
            Some("AWS::S3::Bucket".to_owned())
        );
        assert_eq!(page_identifier("no heading here\n"), None);
    }

    #[test]
    fn read_page_falls_back_to_file_stem() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("aws-resource-ec2-instance.md");
        fs::write(&path, "no heading, just text\n")?;

        let file = PageFile {
            path: path.clone(),
            display_path: "aws-resource-ec2-instance.md".into(),
            file_name: "aws-resource-ec2-instance.md".into(),
        };
        let page = read_page(&file).expect("readable page");
        assert_eq!(page.id, "aws-resource-ec2-instance");
        Ok(())
    }

    #[test]
    fn read_page_rejects_non_utf8_content() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("aws-resource-bad.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x01])?;

        let file = PageFile {
            path: path.clone(),
            display_path: "aws-resource-bad.md".into(),
            file_name: "aws-resource-bad.md".into(),
        };
        let err = read_page(&file).unwrap_err();
        assert!(matches!(err, ExtractError::PageNotText { .. }));
        assert!(err.is_page_local());
        Ok(())
    }

    #[test]
    fn extract_all_skips_undecodable_pages() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();

        fs::write(root.join("aws-resource-good.md"), S3_PAGE)?;
        fs::write(root.join("aws-resource-bad.md"), [0xffu8, 0xfe, 0x00])?;

        let scan = Scanner::new().scan(&ScannerConfig::from_root(
            root.to_path_buf(),
            Config::default(),
        ))?;
        let results = extract_all(&scan)?;

        assert_eq!(results.len(), 1);
        let facts = results.get("AWS::S3::Bucket").expect("good page extracted");
        assert_eq!(facts.get_att_targets, vec!["Arn", "DomainName"]);
        Ok(())
    }

    #[test]
    fn extract_all_keeps_first_duplicate() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();

        fs::write(
            root.join("aws-resource-a.md"),
            "# AWS::Fake::Thing\n`Arn`  <a name=\"Arn-fn::getatt\"></a>\n",
        )?;
        fs::write(root.join("aws-resource-b.md"), "# AWS::Fake::Thing\n")?;

        let scan = Scanner::new().scan(&ScannerConfig::from_root(
            root.to_path_buf(),
            Config::default(),
        ))?;
        let results = extract_all(&scan)?;

        assert_eq!(results.len(), 1);
        assert_eq!(
            results.get("AWS::Fake::Thing").unwrap().get_att_targets,
            vec!["Arn"]
        );
        Ok(())
    }
}
