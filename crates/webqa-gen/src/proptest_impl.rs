//! Proptest strategies for synthesis inputs
//!
//! Generates discovered elements and configurations for property-based testing.

use crate::element::{Element, ElementKind};
use crate::framework::Framework;
use crate::synthesis::SynthesisConfig;
use proptest::prelude::*;

/// Strategy for generating element kinds
pub fn element_kind_strategy() -> impl Strategy<Value = ElementKind> {
    prop_oneof![
        3 => Just(ElementKind::Button),
        3 => Just(ElementKind::Input),
        2 => Just(ElementKind::Link),
        1 => Just(ElementKind::Form),
        1 => Just(ElementKind::Select),
        1 => Just(ElementKind::Textarea),
    ]
}

/// Strategy for generating frameworks
pub fn framework_strategy() -> impl Strategy<Value = Framework> {
    prop_oneof![
        Just(Framework::Playwright),
        Just(Framework::Selenium),
        Just(Framework::Cypress),
    ]
}

/// Strategy for generating CSS selectors, including ones that need escaping
pub fn selector_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "#[a-z][a-z0-9-]{0,12}".prop_map(|s| s),
        "\\.[a-z][a-z0-9_-]{0,12}".prop_map(|s| s),
        Just("input[name='email']".to_string()),
        Just(r#"button[data-testid="submit"]"#.to_string()),
        Just(r"a[href$='\\.pdf']".to_string()),
    ]
}

/// Strategy for generating a single element with the given ID
pub fn element_strategy(id: String) -> impl Strategy<Value = Element> {
    (
        element_kind_strategy(),
        selector_strategy(),
        proptest::option::of("[A-Za-z ]{1,20}"),
        prop::sample::select(vec!["text", "email", "password", "number", "tel"]),
        prop::sample::select(vec!["/", "/about", "contact", "https://other.test/x"]),
    )
        .prop_map(move |(kind, selector, text, input_type, href)| {
            let mut element = Element::new(id.clone(), kind, selector);
            element.display_text = text;
            match kind {
                ElementKind::Input => element.with_attribute("type", input_type),
                ElementKind::Link => element.with_attribute("href", href),
                _ => element,
            }
        })
}

/// Strategy for generating a discovery batch with unique IDs
pub fn elements_strategy(max_len: usize) -> impl Strategy<Value = Vec<Element>> {
    (0..=max_len).prop_flat_map(|len| {
        (0..len)
            .map(|i| element_strategy(format!("el-{i}")))
            .collect::<Vec<_>>()
    })
}

/// Strategy for generating synthesis configurations
pub fn config_strategy() -> impl Strategy<Value = SynthesisConfig> {
    (
        framework_strategy(),
        prop::sample::select(vec![
            "https://app.example.com/",
            "http://localhost:3000/login",
            "https://shop.test/catalog/index.html",
        ]),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(framework, base_url, validation, negative)| {
            SynthesisConfig::new(framework, base_url)
                .with_validation(validation)
                .with_negative_tests(negative)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{Priority, TestCategory, TestSynthesizer, synthesize};
    use crate::template::TestKind;
    use std::collections::BTreeSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_button_yields_one_high_functional_spec(
            selector in selector_strategy(),
            config in config_strategy(),
        ) {
            let element = Element::new("b", ElementKind::Button, selector);
            let specs = synthesize(&[element], &config).unwrap();
            prop_assert_eq!(specs.len(), 1);
            prop_assert_eq!(specs[0].priority, Priority::High);
            prop_assert_eq!(specs[0].category, TestCategory::Functional);
            prop_assert_eq!(&specs[0].covered_element_ids, &BTreeSet::from(["b".to_string()]));
        }

        #[test]
        fn prop_input_with_negative_tests_yields_two_specs(
            selector in selector_strategy(),
            config in config_strategy(),
        ) {
            let config = config.with_negative_tests(true);
            let element = Element::new("i", ElementKind::Input, selector);
            let specs = synthesize(&[element], &config).unwrap();
            prop_assert_eq!(specs.len(), 2);
        }

        #[test]
        fn prop_form_yields_exactly_one_workflow(config in config_strategy()) {
            let element = Element::new("f", ElementKind::Form, "#f");
            let specs = synthesize(&[element], &config).unwrap();
            let workflows = specs.iter().filter(|s| s.kind == TestKind::Workflow).count();
            prop_assert_eq!(workflows, 1);
            prop_assert_eq!(specs.len(), 2);
        }

        #[test]
        fn prop_coverage_is_non_empty_subset(
            elements in elements_strategy(12),
            config in config_strategy(),
        ) {
            let known: BTreeSet<String> = elements.iter().map(|e| e.id.clone()).collect();
            let specs = synthesize(&elements, &config).unwrap();
            for spec in &specs {
                prop_assert!(!spec.covered_element_ids.is_empty());
                prop_assert!(spec.covered_element_ids.is_subset(&known));
                prop_assert_eq!(spec.framework, config.framework);
            }
        }

        #[test]
        fn prop_synthesis_is_deterministic(
            elements in elements_strategy(10),
            config in config_strategy(),
        ) {
            let a = synthesize(&elements, &config).unwrap();
            let b = synthesize(&elements, &config).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_ids_unique_within_batch(
            elements in elements_strategy(12),
            config in config_strategy(),
        ) {
            let specs = synthesize(&elements, &config).unwrap();
            let ids: BTreeSet<&str> = specs.iter().map(|s| s.id.as_str()).collect();
            prop_assert_eq!(ids.len(), specs.len());
        }

        #[test]
        fn prop_unsupported_kinds_are_reported(
            elements in elements_strategy(12),
            config in config_strategy(),
        ) {
            let output = TestSynthesizer::new().synthesize(&elements, &config).unwrap();
            let unsupported = elements.iter().filter(|e| !e.kind.is_synthesized()).count();
            prop_assert_eq!(output.anomalies.len(), unsupported);
        }
    }
}
