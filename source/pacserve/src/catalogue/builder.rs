//! The catalogue builder: correlates zones with templates, renders each
//! pair, and folds the result into a prefix tree.
//!
//! This is the one place that decides what "minor problem" means for a
//! given reload, and the one place that applies the hard-failure
//! fallback policy so the server keeps a servable tree even when one
//! input regresses.

use std::path::Path;

use crate::catalogue::element::LookupElement;
use crate::catalogue::tree::Tree;
use crate::render::{self, RenderParams};
use crate::template::{read_templates, Template};
use crate::zone::{read_zone_file, ZoneRecord};

/// Everything the builder produced, ready to be installed into the store.
pub struct BuildOutcome {
    pub tree: Tree,
    pub zones: Vec<ZoneRecord>,
    pub templates: Vec<Template>,
    pub minor_problems: usize,
}

/// Both readers failed; there is nothing to build from and no fallback
/// to fall back to. The caller should keep serving whatever tree it has.
pub struct NoRebuild;

pub async fn build_catalogue(
    zone_file: &Path,
    template_dir: &Path,
    contact_info: &str,
    default_pac_text: &str,
    cached_zones: &[ZoneRecord],
    cached_templates: &[Template],
) -> Result<BuildOutcome, NoRebuild> {
    let mut problems = 0usize;

    let zone_read = read_zone_file(zone_file).await;
    let template_read = read_templates(template_dir).await;

    let (zones, zone_problems, zones_failed) = match zone_read {
        Ok((records, p)) => (records, p, false),
        Err(e) => {
            tracing::warn!(error = %e, "zone file read failed, falling back to cached zones");
            (cached_zones.to_vec(), 0, true)
        }
    };
    let (templates, template_problems, templates_failed) = match template_read {
        Ok((list, p)) => (list, p, false),
        Err(e) => {
            tracing::warn!(error = %e, "template directory read failed, falling back to cached templates");
            (cached_templates.to_vec(), 0, true)
        }
    };

    if zones_failed && templates_failed {
        return Err(NoRebuild);
    }
    problems += zone_problems + template_problems;
    if zones_failed || templates_failed {
        problems += 1;
    }

    let mut retained_templates = templates.clone();
    let mut elements = Vec::with_capacity(zones.len());

    for zone in &zones {
        let template = find_template(&templates, &zone.pac_filename)
            .or_else(|| find_template(cached_templates, &zone.pac_filename));

        let Some(template) = template else {
            tracing::warn!(pac_filename = %zone.pac_filename, "no template matches zone, skipping");
            problems += 1;
            continue;
        };

        if !templates.iter().any(|t| t.filename == template.filename) {
            tracing::warn!(pac_filename = %template.filename, "template retained from cache");
            retained_templates.push(template.clone());
            problems += 1;
        }

        let params = RenderParams {
            filename: &template.filename,
            contact: contact_info,
        };
        match render::render(&template.filename, &template.content, &params) {
            Ok(rendered) => elements.push(LookupElement::standard(
                zone.network,
                zone.pac_filename.clone(),
                rendered,
            )),
            Err(e) => {
                tracing::warn!(pac_filename = %zone.pac_filename, error = %e, "render failed, skipping zone");
                problems += 1;
            }
        }
    }

    let tie_breaks = count_network_ties(&elements);
    problems += tie_breaks;

    let default_root = LookupElement::synthetic_root(default_pac_text.to_string());
    let tree = Tree::build(elements, default_root);

    Ok(BuildOutcome {
        tree,
        zones,
        templates: retained_templates,
        minor_problems: problems,
    })
}

fn find_template<'a>(templates: &'a [Template], filename: &str) -> Option<&'a Template> {
    templates.iter().find(|t| t.filename == filename)
}

/// Counts pairs of elements sharing an identical network but a different
/// PAC filename, the ambiguous case the tree keeps as siblings rather
/// than collapsing.
fn count_network_ties(elements: &[LookupElement]) -> usize {
    let mut ties = 0usize;
    for i in 0..elements.len() {
        for j in (i + 1)..elements.len() {
            if elements[i].is_identical_net(&elements[j]) && !elements[i].is_identical_pac(&elements[j]) {
                ties += 1;
            }
        }
    }
    ties
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn correlates_zone_with_matching_template() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("pacs");
        std::fs::create_dir_all(&templates_dir).unwrap();
        write_file(&templates_dir, "default.pac", "// default for {{.Contact}}");
        write_file(&templates_dir, "a.pac", "// {{.Filename}} served by {{.Contact}}");

        let zone_path = write_file(dir.path(), "zones.csv", "10.0.0.0,8,a.pac\n");

        let outcome = build_catalogue(
            &zone_path,
            &templates_dir,
            "helpdesk@example.com",
            "// default for helpdesk@example.com",
            &[],
            &[],
        )
        .await
        .unwrap();

        assert_eq!(outcome.minor_problems, 0);
        let (element, _) = outcome.tree.lookup(
            crate::ip::IpNet::from_parts("10.0.0.1", 32).unwrap(),
        );
        assert!(element.rendered_text().contains("a.pac"));
    }

    #[tokio::test]
    async fn unmatched_zone_counts_one_minor_problem() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("pacs");
        std::fs::create_dir_all(&templates_dir).unwrap();
        write_file(&templates_dir, "default.pac", "// default");

        let zone_path = write_file(dir.path(), "zones.csv", "10.0.0.0,8,missing.pac\n");

        let outcome = build_catalogue(&zone_path, &templates_dir, "c", "// default", &[], &[])
            .await
            .unwrap();

        assert_eq!(outcome.minor_problems, 1);
    }

    #[tokio::test]
    async fn missing_template_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("pacs");
        std::fs::create_dir_all(&templates_dir).unwrap();
        // template dir no longer has x.pac; only the cache does.
        write_file(&templates_dir, "default.pac", "// default");

        let zone_path = write_file(dir.path(), "zones.csv", "10.0.0.0,8,x.pac\n");

        let cached_templates = vec![Template {
            filename: "x.pac".to_string(),
            content: "// cached x".to_string(),
        }];

        let outcome = build_catalogue(
            &zone_path,
            &templates_dir,
            "c",
            "// default",
            &[],
            &cached_templates,
        )
        .await
        .unwrap();

        assert_eq!(outcome.minor_problems, 1);
        assert!(outcome.templates.iter().any(|t| t.filename == "x.pac"));
    }

    #[tokio::test]
    async fn both_readers_failing_signals_no_rebuild() {
        let result = build_catalogue(
            Path::new("/nonexistent/zones.csv"),
            Path::new("/nonexistent/pacs"),
            "c",
            "// default",
            &[],
            &[],
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn duplicate_network_different_pac_counts_tie_break() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("pacs");
        std::fs::create_dir_all(&templates_dir).unwrap();
        write_file(&templates_dir, "default.pac", "// default");
        write_file(&templates_dir, "a.pac", "// a");
        write_file(&templates_dir, "b.pac", "// b");

        let zone_path = write_file(
            dir.path(),
            "zones.csv",
            "10.0.0.0,8,a.pac\n10.0.0.0,8,b.pac\n",
        );

        let outcome = build_catalogue(&zone_path, &templates_dir, "c", "// default", &[], &[])
            .await
            .unwrap();

        assert_eq!(outcome.minor_problems, 1);
    }
}
