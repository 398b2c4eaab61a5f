//! Naming and classification heuristics
//!
//! Everything here is a pure function of its inputs. `derive_id` in
//! particular must stay deterministic: re-runs rely on the same component
//! type always mapping to the same descriptor id.

use crate::models::{Category, EditorKind};

/// Keyword rules for categories, first match wins
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["header", "footer", "nav"], Category::Layout),
    (&["hero", "banner"], Category::Content),
    (&["button", "cta"], Category::Interactive),
    (&["image", "gallery", "media"], Category::Media),
    (&["form", "input"], Category::Form),
];

/// Keyword rules for editors (type name only), first match wins
const EDITOR_RULES: &[(&[&str], EditorKind)] = &[
    (&["image"], EditorKind::ImageEditor),
    (&["video"], EditorKind::VideoEditor),
    (&["button", "cta"], EditorKind::ButtonEditor),
    (&["link"], EditorKind::LinkEditor),
    (&["input", "form"], EditorKind::InputEditor),
];

/// Keyword rules for tags; every matching rule contributes
const TAG_RULES: &[(&[&str], &[&str])] = &[
    (&["hero", "banner"], &["hero", "banner"]),
    (&["nav", "header"], &["navigation", "header"]),
    (&["footer"], &["footer", "layout"]),
    (&["image", "media", "gallery"], &["media", "image"]),
    (&["button", "cta"], &["cta", "button"]),
    (&["form", "input"], &["form", "input"]),
    (&["text", "content"], &["content", "text"]),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Kebab-case registry id for a component type
///
/// `HeroBanner` → `hero-banner`. Output only ever contains `[a-z0-9-]`, with
/// no leading, trailing, or doubled hyphens. May be empty when the type has
/// no usable characters.
pub fn derive_id(component_type: &str) -> String {
    let mut separated = String::with_capacity(component_type.len() + 8);
    for ch in component_type.chars() {
        if ch.is_uppercase() {
            separated.push('-');
        }
        separated.extend(ch.to_lowercase());
    }

    let mut id = String::with_capacity(separated.len());
    // Starts true so a leading separator run is dropped
    let mut after_hyphen = true;
    for ch in separated.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            id.push(ch);
            after_hyphen = false;
        } else if !after_hyphen {
            id.push('-');
            after_hyphen = true;
        }
    }
    while id.ends_with('-') {
        id.pop();
    }
    id
}

/// Human display name: `HeroBanner` → `Hero Banner`
pub fn derive_name(component_type: &str) -> String {
    let mut spaced = String::with_capacity(component_type.len() + 8);
    for (i, ch) in component_type.chars().enumerate() {
        match ch {
            '-' | '_' => spaced.push(' '),
            c if c.is_uppercase() && i > 0 => {
                spaced.push(' ');
                spaced.push(c);
            }
            c => spaced.push(c),
        }
    }

    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// StudlyCase identifier from a kebab id: `hero-banner` → `HeroBanner`
///
/// Identifiers that would start with a digit are prefixed with `Component`.
pub fn studly_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for segment in id.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    match out.chars().next() {
        None => "Component".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Component{}", out),
        Some(_) => out,
    }
}

/// Category by keyword containment in the lower-cased type
pub fn infer_category(component_type: &str) -> Category {
    let lower = component_type.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| contains_any(&lower, keywords))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Content)
}

/// Editor by type keywords, then by property names
pub fn infer_editor<'a>(
    component_type: &str,
    property_names: impl IntoIterator<Item = &'a str>,
) -> EditorKind {
    let lower = component_type.to_lowercase();
    if let Some((_, editor)) = EDITOR_RULES
        .iter()
        .find(|(keywords, _)| contains_any(&lower, keywords))
    {
        return *editor;
    }

    let has_text_property = property_names.into_iter().any(|name| {
        let name = name.to_lowercase();
        name.contains("text") || name.contains("content")
    });
    if has_text_property {
        EditorKind::TextEditor
    } else {
        EditorKind::ContainerEditor
    }
}

/// Category tag, keyword tags, then the lower-cased type; no duplicates
pub fn infer_tags(component_type: &str, category: Category) -> Vec<String> {
    let lower = component_type.to_lowercase();
    let mut tags: Vec<String> = vec![category.as_str().to_string()];

    let keyword_tags = TAG_RULES
        .iter()
        .filter(|(keywords, _)| contains_any(&lower, keywords))
        .flat_map(|(_, rule_tags)| rule_tags.iter());
    for tag in keyword_tags {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    if !lower.is_empty() && !tags.contains(&lower) {
        tags.push(lower);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(id: &str) {
        assert!(!id.starts_with('-'), "leading hyphen in {:?}", id);
        assert!(!id.ends_with('-'), "trailing hyphen in {:?}", id);
        assert!(!id.contains("--"), "double hyphen in {:?}", id);
        assert!(
            id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "bad character in {:?}",
            id
        );
    }

    #[test]
    fn test_derive_id_examples() {
        assert_eq!(derive_id("HeroBanner"), "hero-banner");
        assert_eq!(derive_id("heroBanner"), "hero-banner");
        assert_eq!(derive_id("SiteFooter2"), "site-footer2");
        assert_eq!(derive_id("hero_banner"), "hero-banner");
        assert_eq!(derive_id("Hero  Banner!!"), "hero-banner");
        assert_eq!(derive_id("CTAButton"), "c-t-a-button");
        assert_eq!(derive_id("already-kebab"), "already-kebab");
    }

    #[test]
    fn test_derive_id_degenerate_inputs() {
        assert_eq!(derive_id(""), "");
        assert_eq!(derive_id("---"), "");
        assert_eq!(derive_id("_Hero"), "hero");
        assert_eq!(derive_id("Héro"), "h-ro");
    }

    #[test]
    fn test_derive_id_is_pure_and_well_formed() {
        let inputs = [
            "HeroBanner", "nav__Bar", "--Lead--", "A1B2", "x", "UPPER", "with space",
            "émoji🙂Card", "tab\tBar", "9Lives", "a-B-c", "Ünïcode",
        ];
        for input in inputs {
            let first = derive_id(input);
            assert_eq!(first, derive_id(input));
            assert_well_formed(&first);
        }
    }

    #[test]
    fn test_derive_name() {
        assert_eq!(derive_name("HeroBanner"), "Hero Banner");
        assert_eq!(derive_name("heroBanner"), "Hero Banner");
        assert_eq!(derive_name("site_footer"), "Site footer");
        assert_eq!(derive_name(""), "");
    }

    #[test]
    fn test_studly_case() {
        assert_eq!(studly_case("hero-banner"), "HeroBanner");
        assert_eq!(studly_case("site-footer2"), "SiteFooter2");
        assert_eq!(studly_case("3d-card"), "Component3dCard");
        assert_eq!(studly_case(""), "Component");
    }

    #[test]
    fn test_infer_category() {
        assert_eq!(infer_category("SiteHeader"), Category::Layout);
        assert_eq!(infer_category("MainNav"), Category::Layout);
        assert_eq!(infer_category("HeroBanner"), Category::Content);
        assert_eq!(infer_category("CtaStrip"), Category::Interactive);
        assert_eq!(infer_category("ImageGallery"), Category::Media);
        assert_eq!(infer_category("ContactForm"), Category::Form);
        assert_eq!(infer_category("Testimonial"), Category::Content);
        // Layout keywords outrank later rules
        assert_eq!(infer_category("HeaderBanner"), Category::Layout);
    }

    #[test]
    fn test_infer_editor() {
        assert_eq!(infer_editor("ImageTile", []), EditorKind::ImageEditor);
        assert_eq!(infer_editor("VideoEmbed", []), EditorKind::VideoEditor);
        assert_eq!(infer_editor("CtaButton", []), EditorKind::ButtonEditor);
        assert_eq!(infer_editor("LinkList", []), EditorKind::LinkEditor);
        assert_eq!(infer_editor("SignupForm", []), EditorKind::InputEditor);
        assert_eq!(infer_editor("Quote", ["bodyText"]), EditorKind::TextEditor);
        assert_eq!(infer_editor("Quote", ["content"]), EditorKind::TextEditor);
        assert_eq!(infer_editor("Spacer", ["height"]), EditorKind::ContainerEditor);
    }

    #[test]
    fn test_infer_tags() {
        let tags = infer_tags("HeroBanner", Category::Content);
        assert_eq!(tags, vec!["content", "hero", "banner", "herobanner"]);

        let tags = infer_tags("SiteFooter", Category::Layout);
        assert_eq!(tags, vec!["layout", "footer", "sitefooter"]);

        // Lower-cased type not repeated when it is already a tag
        let tags = infer_tags("Footer", Category::Layout);
        assert_eq!(tags, vec!["layout", "footer"]);
    }
}
