use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {TabsList, div, "bg-muted text-muted-foreground inline-flex h-9 w-full items-center justify-center rounded-lg p-[3px]"}
}

pub use components::*;

#[component]
pub fn TabsTrigger(
    #[prop(into)] active: Signal<bool>,
    #[prop(into)] on_select: Callback<()>,
    children: Children,
) -> impl IntoView {
    let class = move || {
        tw_merge!(
            "inline-flex h-full flex-1 items-center justify-center rounded-md px-2 py-1 text-sm font-medium transition-[color,box-shadow] hover:cursor-pointer",
            if active.get() {
                "bg-background text-foreground shadow-sm dark:bg-input/30"
            } else {
                "text-muted-foreground"
            }
        )
    };

    view! {
        <button
            type="button"
            role="tab"
            class=class
            aria-selected=move || if active.get() { "true" } else { "false" }
            on:click=move |_| on_select.run(())
        >
            {children()}
        </button>
    }
}
