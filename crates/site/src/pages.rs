use leptos::*;
use leptos_router::*;

use crate::content::{find_project, project_matches, Project, PROJECTS};
use crate::retro::{use_retro_windows, PixelImage, RetroCanvas, RetroWindow};

#[component]
fn ProjectCard(project: &'static Project) -> impl IntoView {
    view! {
        <PixelImage src=project.image alt=project.title />
        <p class="project-card__summary">{project.summary}</p>
        <p class="project-card__meta">{format!("{} / {}", project.kind, project.year)}</p>
        <A href=format!("/projects/{}", project.slug)>"Open project"</A>
    }
}

/// Home desktop: featured projects scattered over one canvas.
#[component]
pub fn HomeDesktop() -> impl IntoView {
    let retro = use_retro_windows();
    let featured = PROJECTS.iter().filter(|project| project.featured);

    view! {
        <RetroCanvas label="Desktop">
            <RetroWindow title="readme.txt">
                <p>"Drag the title bars, resize from the corner, close what you do not need."</p>
                <p>
                    "Links in a window behind another one focus it first; click again to follow."
                </p>
                <button type="button" class="desk-button" on:click=move |_| retro.rescatter()>
                    "Shuffle desk"
                </button>
                <A href="/projects">"All projects"</A>
            </RetroWindow>
            {featured
                .map(|project| {
                    view! {
                        <RetroWindow title=format!("{}.{}", project.slug, project.kind.to_lowercase())>
                            <ProjectCard project=project />
                        </RetroWindow>
                    }
                })
                .collect_view()}
        </RetroCanvas>
    }
}

/// Searchable list of every project. An active query switches the canvas to grid mode so the
/// matches read as a tidy list; clearing it restores the scatter.
#[component]
pub fn ProjectIndex() -> impl IntoView {
    let retro = use_retro_windows();
    let query = create_rw_signal(String::new());
    let needle = create_memo(move |_| query.with(|query| query.trim().to_lowercase()));
    let filtering = create_memo(move |_| needle.with(|needle| !needle.is_empty()));

    create_effect(move |previous: Option<bool>| {
        let on = filtering.get();
        if previous.is_some_and(|was| was != on) {
            retro.set_grid_mode(on);
        }
        on
    });

    view! {
        <div class="project-index">
            <label class="project-index__search">
                "Search "
                <input
                    type="search"
                    placeholder="title, type or tag"
                    prop:value=move || query.get()
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
            </label>
            <RetroCanvas label="Projects">
                {PROJECTS
                    .iter()
                    .map(|project| {
                        let hidden = Signal::derive(move || {
                            needle.with(|needle| !needle.is_empty() && !project_matches(project, needle))
                        });
                        view! {
                            <RetroWindow title=project.title hidden=hidden>
                                <ProjectCard project=project />
                            </RetroWindow>
                        }
                    })
                    .collect_view()}
            </RetroCanvas>
        </div>
    }
}

/// One project spread over a few windows.
#[component]
pub fn ProjectDetail() -> impl IntoView {
    let params = use_params_map();
    let project = move || params.with(|map| map.get("slug").and_then(|slug| find_project(slug)));

    move || match project() {
        Some(project) => view! {
            <RetroCanvas label=project.title>
                <RetroWindow title=format!("{}.img", project.slug)>
                    <PixelImage src=project.image alt=project.title />
                </RetroWindow>
                <RetroWindow title="about.txt">
                    <h1>{project.title}</h1>
                    <p>{project.summary}</p>
                    <p>{format!("{} / {}", project.kind, project.year)}</p>
                </RetroWindow>
                <RetroWindow title="tags">
                    <ul class="tag-list">
                        {project
                            .tags
                            .iter()
                            .map(|tag| view! { <li>{*tag}</li> })
                            .collect_view()}
                    </ul>
                    <A href="/projects">"Back to all projects"</A>
                </RetroWindow>
            </RetroCanvas>
        }
        .into_view(),
        None => view! {
            <section class="canonical-content">
                <h1>"Project not found"</h1>
                <A href="/projects">"Back to all projects"</A>
            </section>
        }
        .into_view(),
    }
}
