use proptest::prelude::*;

use mathfonts_core::template::{count_font_faces, render_font_css, rewrite_base_path};
use mathfonts_core::{KATEX_FONT_FACES, PATH_TOKEN};

#[test]
fn rebases_urls_onto_absolute_path() {
    let css = render_font_css("/assets/");
    assert!(css.contains("url(/assets/KaTeX_Main-Bold.eot)"));
    assert!(css.contains("url(/assets/KaTeX_Main-Bold.eot#iefix) format('embedded-opentype')"));
    assert!(!css.contains("fonts/KaTeX"));
}

#[test]
fn empty_base_path_leaves_bare_file_names() {
    let css = render_font_css("");
    assert!(css.contains("url(KaTeX_Main-Bold.eot)"));
    assert!(css.contains("url(KaTeX_Typewriter-Regular.ttf) format('truetype')"));
    assert_eq!(css.len(), KATEX_FONT_FACES.len() - 80 * PATH_TOKEN.len());
}

#[test]
fn base_path_containing_token_is_not_rewritten_again() {
    let css = render_font_css("x/fonts/y/");
    assert!(css.contains("url(x/fonts/y/KaTeX_AMS-Regular.eot)"));
    assert!(!css.contains("x/x/fonts/y/y/"));
    assert_eq!(
        css.matches("x/fonts/y/").count(),
        KATEX_FONT_FACES.matches(PATH_TOKEN).count()
    );
}

#[test]
fn regex_special_characters_are_literal() {
    let css = render_font_css(r"$&.*+?^{}()|[]\/");
    assert!(css.contains(r"url($&.*+?^{}()|[]\/KaTeX_Size1-Regular.woff)"));
}

#[test]
fn only_the_token_changes() {
    let css = rewrite_base_path("fonts/a fonts fonts/b /fonts/", "P");
    assert_eq!(css, "Pa fonts Pb /P");
}

proptest! {
    #[test]
    fn output_is_template_with_token_replaced(base in ".{0,40}") {
        let css = render_font_css(&base);
        let expected = KATEX_FONT_FACES.split(PATH_TOKEN).collect::<Vec<_>>().join(base.as_str());
        prop_assert_eq!(css, expected);
    }

    #[test]
    fn rule_count_is_preserved(base in "[a-zA-Z0-9/:._-]{0,32}") {
        let css = render_font_css(&base);
        prop_assert_eq!(count_font_faces(&css), count_font_faces(KATEX_FONT_FACES));
    }

    #[test]
    fn length_grows_by_base_path_per_token(base in ".{0,24}") {
        let tokens = KATEX_FONT_FACES.matches(PATH_TOKEN).count();
        let css = render_font_css(&base);
        prop_assert_eq!(
            css.len(),
            KATEX_FONT_FACES.len() - tokens * PATH_TOKEN.len() + tokens * base.len()
        );
    }
}
