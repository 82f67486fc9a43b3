use super::*;
use crate::assets::Assets;
use crate::forms::{FieldKind, FieldSpec};

fn form(name: &str) -> FormSchema {
    FormSchema::new(name, vec![FieldSpec::new("email", FieldKind::Email)], Assets::new()).unwrap()
}

fn kind<'a>(registry: &'a Registry, name: &str) -> &'a PanelKind {
    match registry.get(name) {
        Some(Component::Panel(kind)) => kind,
        _ => panic!("{name} is not a panel kind"),
    }
}

#[test]
fn builtins_are_panel_kinds() {
    let registry = Registry::with_builtins();
    assert_eq!(registry.get(TEMPLATE_KIND).map(Component::describe), Some("panel kind"));
    assert_eq!(registry.get(FORM_KIND).map(Component::describe), Some("panel kind"));
    assert!(Registry::new().get(TEMPLATE_KIND).is_none());
}

#[test]
fn forms_are_registered_as_forms() {
    let mut registry = Registry::with_builtins();
    registry.register_form(form("name_form")).unwrap();
    assert_eq!(registry.get("name_form").map(Component::describe), Some("form"));
    assert!(registry.form("name_form").is_some());
    assert!(registry.form(TEMPLATE_KIND).is_none());
}

#[test]
fn form_names_cannot_shadow_components() {
    let mut registry = Registry::with_builtins();
    let err = registry.register_form(form(TEMPLATE_KIND)).unwrap_err();
    assert!(err.to_string().contains("panel kind"));
    registry.register_form(form("f")).unwrap();
    assert!(registry.register_form(form("f")).is_err());
}

#[test]
fn template_kind_accepts_null_options() {
    let registry = Registry::with_builtins();
    assert!(kind(&registry, TEMPLATE_KIND)(serde_yaml::Value::Null, &registry).is_ok());
}

#[test]
fn template_kind_rejects_foreign_options() {
    let registry = Registry::with_builtins();
    let options: serde_yaml::Value = serde_yaml::from_str("form: name_form\n").unwrap();
    let reason = kind(&registry, TEMPLATE_KIND)(options, &registry).err().unwrap();
    assert!(reason.contains("form"));
}

#[test]
fn form_kind_requires_known_form() {
    let mut registry = Registry::with_builtins();
    let options: serde_yaml::Value = serde_yaml::from_str("form: name_form\n").unwrap();
    let reason = kind(&registry, FORM_KIND)(options.clone(), &registry).err().unwrap();
    assert!(reason.contains("unknown form `name_form`"));

    registry.register_form(form("name_form")).unwrap();
    assert!(kind(&registry, FORM_KIND)(options, &registry).is_ok());
}

#[test]
fn form_kind_requires_form_option() {
    let registry = Registry::with_builtins();
    assert!(kind(&registry, FORM_KIND)(serde_yaml::Value::Null, &registry).is_err());
}
