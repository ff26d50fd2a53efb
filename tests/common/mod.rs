#![allow(dead_code)]

use std::fs;
use std::path::Path;

use design_lens::{DesignService, DesignVault};
use tempfile::TempDir;

const SITE: &str = r#"
site:
  name: Shop Front
viewports:
  - {id: mobile, name: Mobile, maxWidth: 767}
  - {id: desktop, name: Desktop, minWidth: 1024}
  - {id: tablet, name: Tablet, minWidth: 768, maxWidth: 1023}
"#;

const APP_LAYOUT: &str = r#"
areas:
  - areaId: app-root
    gridAreas:
      - [header, header]
      - [nav, main-content]
  - areaId: header
    name: Header
    layout: horizontal
    children: ['$logo', '$cart-link', '$account-link']
  - areaId: nav
    name: Side Navigation
    layout: vertical
    children: ['$home-link', '$orders-link']
    responsiveBehavior:
      mobile: {hidden: true}
  - areaId: main-content
    layout: vertical
elements:
  - {elementId: logo, label: Logo}
  - {elementId: cart-link, label: Cart, layoutHint: rightAligned}
  - {elementId: account-link, label: Account, layoutHint: rightAligned}
  - {elementId: home-link, label: Home}
  - {elementId: orders-link, label: Orders}
"#;

const APP_EVENTS: &str = r#"
events:
  - eventId: go-home
    name: Home
    trigger: {element: home-link, event: click}
    actions: [{type: navigate, target: home}]
  - eventId: go-orders
    trigger: {element: orders-link, event: click}
    actions: [{type: navigate, target: orders}]
  - eventId: go-cart
    name: Cart
    trigger: {element: cart-link, event: click}
    actions: [{type: navigate, target: cart}]
"#;

const APP_FIELDS: &str = r#"
- {fieldId: search, name: search, type: text, label: Search}
- {fieldId: email, name: email, type: text, label: Shared email}
"#;

const HOME_LAYOUT: &str = r#"
screenId: home
title: Home
description: Landing page
extends: _shared/app-layout
mainContent:
  children: ['@hero', '$search-box']
areas:
  - areaId: hero
    layout: horizontal
    children: ['@promo', '@deals']
  - {areaId: promo, sizeHint: fill}
  - {areaId: deals, sizeHint: narrow}
elements:
  - {elementId: search-box, fieldRef: search}
  - {elementId: logo, label: Home Logo}
"#;

const HOME_EVENTS: &str = r#"
events:
  - eventId: go-cart
    name: Open cart
    trigger: {element: cart-link, event: click}
    actions: [{type: navigate, target: cart}]
  - eventId: search
    trigger: {element: search, event: submit}
    actions:
      - type: callApi
        interfaceRef: search-api
        onSuccess: [{type: navigate, target: results}]
        onError: [{type: navigate, target: partner-help}]
"#;

const LOGIN_LAYOUT: &str = r#"
title: Login
areas:
  - areaId: form
    layout: vertical
    children: ['$email', '$password', '$submit', '$ghost']
elements:
  - {elementId: email, fieldRef: email}
  - {elementId: password, fieldRef: password}
  - {elementId: submit}
"#;

const LOGIN_FIELDS: &str = r#"
- {fieldId: email, name: email, type: email, label: Email}
- {fieldId: password, name: password, type: password, label: Password}
"#;

pub fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// A design tree with three sites:
/// - `shop`: shared chrome, screens `broken`, `empty-dir`, `home`, `login`, `results`
/// - `blog`: manifest only
/// - `legacy`: unreadable manifest
/// plus a reserved `_drafts` directory.
pub fn design_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "sites/shop/site.yaml", SITE);
    write(root, "sites/shop/_shared/app-layout.yaml", APP_LAYOUT);
    write(root, "sites/shop/_shared/app-events.yaml", APP_EVENTS);
    write(root, "sites/shop/_shared/app-fields.yaml", APP_FIELDS);
    write(root, "sites/shop/screens/home/layout.yaml", HOME_LAYOUT);
    write(root, "sites/shop/screens/home/events.yaml", HOME_EVENTS);
    write(root, "sites/shop/screens/login/layout.yaml", LOGIN_LAYOUT);
    write(root, "sites/shop/screens/login/fields.yaml", LOGIN_FIELDS);
    write(root, "sites/shop/screens/login/events.yaml", "events: [ {\n");
    write(root, "sites/shop/screens/results/layout.yaml", "title: Results\n");
    write(root, "sites/shop/screens/broken/layout.yaml", "areas: [[[\n");
    fs::create_dir_all(root.join("sites/shop/screens/empty-dir")).unwrap();

    write(root, "sites/blog/site.yaml", "name: Blog\n");
    write(root, "sites/legacy/site.yaml", "name: [unclosed\n");
    write(root, "sites/_drafts/site.yaml", "name: Drafts\n");

    dir
}

pub fn service(dir: &TempDir) -> DesignService {
    DesignService::new(DesignVault::new(dir.path()))
}
