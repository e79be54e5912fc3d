use api_auth::SessionContext;

/// Entry of the navigation bar. Groups render as a dropdown on desktop and
/// as an indented list in the mobile menu.
#[derive(Debug, Clone, PartialEq)]
pub enum NavItem {
    Leaf {
        label: &'static str,
        target: &'static str,
    },
    Group {
        label: &'static str,
        children: Vec<NavItem>,
    },
}

impl NavItem {
    pub fn label(&self) -> &str {
        match self {
            NavItem::Leaf { label, .. } | NavItem::Group { label, .. } => *label,
        }
    }

    /// Link target; groups have none.
    pub fn target(&self) -> Option<&str> {
        match self {
            NavItem::Leaf { target, .. } => Some(*target),
            NavItem::Group { .. } => None,
        }
    }

    pub fn children(&self) -> &[NavItem] {
        match self {
            NavItem::Leaf { .. } => &[],
            NavItem::Group { children, .. } => children,
        }
    }
}

pub fn nav_items() -> Vec<NavItem> {
    vec![
        NavItem::Leaf {
            label: "pricing",
            target: "/pricing",
        },
        NavItem::Leaf {
            label: "account",
            target: "/account",
        },
    ]
}

/// Page chrome shared by every template.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub items: Vec<NavItem>,
    pub signed_in: bool,
    /// Session resolution did not finish; auth controls are hidden.
    pub loading: bool,
}

impl Layout {
    pub fn new(title: &str, session: &SessionContext) -> Self {
        Layout {
            title: title.to_string(),
            items: nav_items(),
            signed_in: session.user().is_some(),
            loading: session.is_loading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_exposes_children_but_no_target() {
        let group = NavItem::Group {
            label: "more",
            children: nav_items(),
        };
        assert_eq!(group.target(), None);
        assert_eq!(group.children().len(), 2);
        assert_eq!(group.children()[0].target(), Some("/pricing"));
    }

    #[test]
    fn layout_follows_session() {
        assert!(!Layout::new("Pricing", &SessionContext::Absent).signed_in);
        assert!(Layout::new("Pricing", &SessionContext::Loading).loading);
    }
}
