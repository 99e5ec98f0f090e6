use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardItem,
    CardList, CardTitle, Input,
};
use crate::models::TodoItem;
use crate::projection::ListView;
use crate::state::AppContext;
use icons::{Check, Undo2};
use leptos::prelude::*;

#[component]
fn TrashIcon() -> impl IntoView {
    view! {
        <svg
            xmlns="http://www.w3.org/2000/svg"
            width="16"
            height="16"
            viewBox="0 0 24 24"
            fill="none"
            stroke="currentColor"
            stroke-width="2"
            stroke-linecap="round"
            stroke-linejoin="round"
            aria-hidden="true"
        >
            <path d="M3 6h18" />
            <path d="M8 6V4h8v2" />
            <path d="M19 6l-1 14H6L5 6" />
            <path d="M10 11v6" />
            <path d="M14 11v6" />
        </svg>
    }
}

#[component]
pub fn TodoListCard(list: ListView) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let list_id = StoredValue::new(list.id.clone());
    let draft: RwSignal<String> = RwSignal::new(String::new());

    let add_item = {
        let app = app_state.0.clone();
        Callback::new(move |_: ()| {
            let result = app
                .list_store()
                .add_item(&list_id.get_value(), &draft.get_untracked());
            if result.is_ok() {
                draft.set(String::new());
            }
            app.dispatch(result);
        })
    };

    let on_delete_list = {
        let app = app_state.0.clone();
        move |_| app.dispatch(app.list_store().delete_list(&list_id.get_value()))
    };

    let summary = if list.total == 0 {
        "No tasks yet".to_string()
    } else {
        format!("{} of {} done", list.completed, list.total)
    };

    let rows = list
        .items
        .into_iter()
        .map(|item| view! { <TodoItemRow list_id=list_id.get_value() item=item /> })
        .collect_view();

    view! {
        <Card attr:data-list-id=list.id>
            <CardHeader>
                <div class="min-w-0 space-y-1">
                    <CardTitle class="truncate text-sm">{list.label}</CardTitle>
                    <CardDescription>{summary}</CardDescription>
                </div>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    class="h-7 w-7 text-destructive"
                    attr:title="Delete list"
                    on:click=on_delete_list
                >
                    <TrashIcon />
                </Button>
            </CardHeader>

            <CardContent class="space-y-2">
                <CardList>{rows}</CardList>

                <div class="flex items-center gap-2">
                    <Input
                        placeholder="Add a task"
                        bind_value=draft
                        on_enter=add_item
                        class="h-8 text-sm"
                    />
                    <Button size=ButtonSize::Sm on:click=move |_| add_item.run(())>
                        "Add"
                    </Button>
                </div>
            </CardContent>
        </Card>
    }
}

#[component]
pub fn TodoItemRow(list_id: String, item: TodoItem) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let ids = StoredValue::new((list_id, item.id.clone()));

    let on_toggle = {
        let app = app_state.0.clone();
        move |_| {
            let (list_id, item_id) = ids.get_value();
            app.dispatch(app.list_store().toggle_item(&list_id, &item_id));
        }
    };

    let on_delete = {
        let app = app_state.0.clone();
        move |_| {
            let (list_id, item_id) = ids.get_value();
            app.dispatch(app.list_store().delete_item(&list_id, &item_id));
        }
    };

    let toggle_title = if item.completed {
        "Mark as not done"
    } else {
        "Mark as done"
    };

    let text_class = if item.completed {
        "flex-1 truncate text-sm text-muted-foreground line-through"
    } else {
        "flex-1 truncate text-sm"
    };

    view! {
        <CardItem>
            <span class=text_class>{item.text}</span>
            <Button
                variant=ButtonVariant::Outline
                size=ButtonSize::Xs
                attr:title=toggle_title
                on:click=on_toggle
            >
                {if item.completed {
                    view! { <Undo2 /> "Undo" }.into_any()
                } else {
                    view! { <Check /> "Complete" }.into_any()
                }}
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                class="h-7 w-7 text-destructive"
                attr:title="Delete task"
                on:click=on_delete
            >
                <TrashIcon />
            </Button>
        </CardItem>
    }
}
