use leptos::prelude::*;
use leptos_ui::{clx, variants};

variants! {
    Alert {
        base: "relative w-full rounded-lg border px-4 py-3 text-sm",
        variants: {
            variant: {
                Default: "bg-card text-card-foreground",
                Destructive: "border-destructive/30 text-destructive",
                Warning: "border-warning/40 text-warning-foreground bg-warning/10",
            },
            size: {
                Default: "",
            }
        },
        component: {
            element: div
        }
    }
}

mod components {
    use super::*;
    clx! {AlertDescription, p, "text-xs [&_p]:leading-relaxed"}
}

pub use components::*;
