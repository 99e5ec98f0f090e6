use crate::components::todo::TodoListCard;
use crate::components::ui::{
    Alert, AlertDescription, AlertVariant, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, FieldError, Input, Label, Spinner, TabsList,
    TabsTrigger,
};
use crate::models::AuthState;
use crate::state::AppContext;
use crate::validate::{password_strength, validate_sign_in, validate_sign_up, PasswordStrength};
use icons::{LogOut, Moon, Sun};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthTab {
    SignIn,
    SignUp,
}

fn strength_class(strength: PasswordStrength) -> &'static str {
    match strength {
        PasswordStrength::Weak => "text-destructive",
        PasswordStrength::Moderate => "text-warning-foreground",
        PasswordStrength::Strong => "text-success",
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let tab: RwSignal<AuthTab> = RwSignal::new(AuthTab::SignIn);
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());

    let email_error: RwSignal<Option<String>> = RwSignal::new(None);
    let password_error: RwSignal<Option<String>> = RwSignal::new(None);
    let confirm_error: RwSignal<Option<String>> = RwSignal::new(None);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let clear_errors = move || {
        email_error.set(None);
        password_error.set(None);
        confirm_error.set(None);
        error.set(None);
    };

    let select_tab = move |next: AuthTab| {
        tab.set(next);
        confirm_password.set(String::new());
        clear_errors();
    };

    let strength = move || {
        let p = password.get();
        (!p.is_empty()).then(|| password_strength(&p))
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        clear_errors();

        let mode = tab.get_untracked();
        let email_val = email.get_untracked().trim().to_string();
        let password_val = password.get_untracked();

        let checked = match mode {
            AuthTab::SignIn => validate_sign_in(&email_val, &password_val),
            AuthTab::SignUp => {
                validate_sign_up(&email_val, &password_val, &confirm_password.get_untracked())
            }
        };
        if let Err(errs) = checked {
            email_error.set(errs.email.map(|e| e.to_string()));
            password_error.set(errs.password.map(|e| e.to_string()));
            confirm_error.set(errs.confirm_password.map(|e| e.to_string()));
            return;
        }

        let app = app_state.0.clone();
        let mut client = app.auth_client.get_untracked();
        loading.set(true);

        spawn_local(async move {
            let result = match mode {
                AuthTab::SignIn => client.sign_in(&email_val, &password_val).await,
                AuthTab::SignUp => client.sign_up(&email_val, &password_val).await,
            };
            match result {
                Ok(identity) => {
                    app.complete_sign_in(client, identity);
                    navigate.with_value(|nav| nav("/", Default::default()));
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <span class="text-sm font-medium text-foreground">"Task Lists"</span>
                </div>

                <Card>
                    <CardHeader class="flex-col items-stretch">
                        <TabsList>
                            <TabsTrigger
                                active=Signal::derive(move || tab.get() == AuthTab::SignIn)
                                on_select=Callback::new(move |_: ()| select_tab(AuthTab::SignIn))
                            >
                                "Sign in"
                            </TabsTrigger>
                            <TabsTrigger
                                active=Signal::derive(move || tab.get() == AuthTab::SignUp)
                                on_select=Callback::new(move |_: ()| select_tab(AuthTab::SignUp))
                            >
                                "Sign up"
                            </TabsTrigger>
                        </TabsList>
                        <CardTitle class="pt-2 text-lg">
                            {move || match tab.get() {
                                AuthTab::SignIn => "Welcome back",
                                AuthTab::SignUp => "Create account",
                            }}
                        </CardTitle>
                        <CardDescription>"Use your email and password to continue."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit novalidate=true>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    invalid=Signal::derive(move || email_error.get().is_some())
                                    class="h-8 text-sm"
                                />
                                <FieldError message=email_error />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    invalid=Signal::derive(move || password_error.get().is_some())
                                    class="h-8 text-sm"
                                />
                                <Show
                                    when=move || tab.get() == AuthTab::SignUp && strength().is_some()
                                    fallback=|| ().into_view()
                                >
                                    {move || {
                                        strength().map(|s| {
                                            view! {
                                                <p class=format!("text-xs {}", strength_class(s))>
                                                    {format!("Strength: {s}")}
                                                </p>
                                            }
                                        })
                                    }}
                                </Show>
                                <FieldError message=password_error />
                            </div>

                            <Show when=move || tab.get() == AuthTab::SignUp fallback=|| ().into_view()>
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="confirm_password">"Confirm password"</Label>
                                    <Input
                                        id="confirm_password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=confirm_password
                                        invalid=Signal::derive(move || confirm_error.get().is_some())
                                        class="h-8 text-sm"
                                    />
                                    <FieldError message=confirm_error />
                                </div>
                            </Show>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                <Alert variant=AlertVariant::Destructive>
                                    <AlertDescription>{move || error.get().unwrap_or_default()}</AlertDescription>
                                </Alert>
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || match (loading.get(), tab.get()) {
                                        (true, AuthTab::SignIn) => "Signing in...",
                                        (true, AuthTab::SignUp) => "Creating account...",
                                        (false, AuthTab::SignIn) => "Sign in",
                                        (false, AuthTab::SignUp) => "Sign up",
                                    }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn TodoPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let new_label: RwSignal<String> = RwSignal::new(String::new());

    let add_list = {
        let app = app_state.0.clone();
        Callback::new(move |_: ()| {
            let result = app.list_store().add_list(&new_label.get_untracked());
            if result.is_ok() {
                new_label.set(String::new());
            }
            app.dispatch(result);
        })
    };

    let on_sign_out = {
        let app = app_state.0.clone();
        move |_| app.sign_out()
    };

    let on_toggle_theme = {
        let app = app_state.0.clone();
        move |_| app.toggle_theme()
    };

    let on_toggle_completed = {
        let app = app_state.0.clone();
        move |_| app.set_show_completed(!app.show_completed.get_untracked())
    };

    let user_label = {
        let app = app_state.0.clone();
        move || match app.auth_state.get() {
            AuthState::Authenticated(identity) => identity.email.unwrap_or(identity.uid),
            AuthState::Unauthenticated => String::new(),
        }
    };

    let show_completed = app_state.0.show_completed;
    let light_theme = app_state.0.light_theme;
    let action_error = app_state.0.action_error;

    let views = {
        let app = app_state.0.clone();
        move || app.views()
    };

    let sync_error = {
        let app = app_state.0.clone();
        move || app.sync_error()
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-2xl space-y-4 px-4 py-8">
                <header class="flex items-center justify-between gap-2">
                    <div class="min-w-0">
                        <h1 class="text-base font-semibold text-foreground">"Task Lists"</h1>
                        <p class="truncate text-xs text-muted-foreground">{user_label}</p>
                    </div>
                    <div class="flex items-center gap-1">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=on_toggle_completed
                        >
                            {move || if show_completed.get() { "Hide completed" } else { "Show completed" }}
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            attr:title="Toggle theme"
                            on:click=on_toggle_theme
                        >
                            {move || if light_theme.get() {
                                view! { <Moon /> }.into_any()
                            } else {
                                view! { <Sun /> }.into_any()
                            }}
                        </Button>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=on_sign_out
                        >
                            <LogOut />
                            "Sign out"
                        </Button>
                    </div>
                </header>

                <div class="flex items-center gap-2">
                    <Input
                        placeholder="New list name"
                        bind_value=new_label
                        on_enter=add_list
                        class="h-9 text-sm"
                    />
                    <Button on:click=move |_| add_list.run(())>"Add list"</Button>
                </div>

                <Show when=move || action_error.get().is_some() fallback=|| ().into_view()>
                    <Alert variant=AlertVariant::Destructive>
                        <AlertDescription>{move || action_error.get().unwrap_or_default()}</AlertDescription>
                    </Alert>
                </Show>

                {move || {
                    sync_error().map(|e| {
                        view! {
                            <Alert variant=AlertVariant::Warning>
                                <AlertDescription>{format!("Showing saved data; sync failed: {e}")}</AlertDescription>
                            </Alert>
                        }
                    })
                }}

                <div class="grid gap-4 sm:grid-cols-2">
                    {move || {
                        let lists = views();
                        if lists.is_empty() {
                            view! {
                                <p class="text-xs text-muted-foreground">"No lists yet. Create one above."</p>
                            }
                            .into_any()
                        } else {
                            lists
                                .into_iter()
                                .map(|list| view! { <TodoListCard list=list /> })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}

/// Lists when signed in, the login form otherwise.
#[component]
pub fn RootPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth_state = app_state.0.auth_state;
    let is_authenticated = move || matches!(auth_state.get(), AuthState::Authenticated(_));

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            <TodoPage />
        </Show>
    }
}
