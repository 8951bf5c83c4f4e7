//! Semantic axis: palette classes standing for a role (heading text, body text,
//! accent) on the elements that play that role.

use crate::error::Result;
use crate::palette::{PaletteClass, Slot};
use pagesmith_markup::{set_attribute, MarkupTree, Splice};

/// Palette classes currently applied to the slot's elements.
pub fn scan(source: &str, slot: Slot) -> Result<Vec<String>> {
    let tree = MarkupTree::parse(source)?;
    Ok(tree
        .find_by_tags(slot.tags())
        .into_iter()
        .flat_map(|idx| tree.element(idx).classes().collect::<Vec<_>>())
        .filter(|token| PaletteClass::parse(token).is_some())
        .map(str::to_string)
        .collect())
}

/// Point every element of `slot` at `family`: existing palette classes are replaced
/// (base and `dark:` together) and missing ones are added.
pub fn sweep(source: &str, slot: Slot, family: &str) -> Result<Option<(Vec<Splice>, Vec<String>)>> {
    let tree = MarkupTree::parse(source)?;
    let (light, dark) = slot.classes(family);
    let mut splices = Vec::new();
    let mut written = Vec::new();

    for idx in tree.find_by_tags(slot.tags()) {
        let element = tree.element(idx);
        let tokens: Vec<&str> = element.classes().collect();

        let mut has_light = false;
        let mut has_dark = false;
        let mut classes: Vec<String> = tokens
            .iter()
            .map(|token| match PaletteClass::parse(token) {
                Some(class) if class.dark => {
                    has_dark = true;
                    dark.clone()
                }
                Some(_) => {
                    has_light = true;
                    light.clone()
                }
                None => token.to_string(),
            })
            .collect();
        if !has_light {
            classes.push(light.clone());
        }
        if !has_dark {
            classes.push(dark.clone());
        }
        classes.dedup();

        if classes.iter().map(String::as_str).eq(tokens.iter().copied()) {
            continue;
        }
        written.extend(
            [&light, &dark]
                .into_iter()
                .filter(|class| !tokens.contains(&class.as_str()))
                .cloned(),
        );
        let name = element
            .class_attr()
            .map(|attr| attr.name.as_str())
            .unwrap_or("class");
        splices.push(set_attribute(element, name, &classes.join(" ")));
    }

    Ok((!splices.is_empty()).then_some((splices, written)))
}
