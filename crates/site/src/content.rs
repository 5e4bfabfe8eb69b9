//! Static portfolio content.

/// One portfolio entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    /// URL segment under `/projects/`.
    pub slug: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Project type shown in the window title bar, e.g. "Installation".
    pub kind: &'static str,
    /// Year finished.
    pub year: u16,
    /// One-sentence description.
    pub summary: &'static str,
    /// Cover image path, revealed with the pixelation effect.
    pub image: &'static str,
    /// Lowercase search tags.
    pub tags: &'static [&'static str],
    /// Shown on the home desktop.
    pub featured: bool,
}

/// Every project, in display order.
pub const PROJECTS: &[Project] = &[
    Project {
        slug: "signal-garden",
        title: "Signal Garden",
        kind: "Installation",
        year: 2024,
        summary: "Radio noise rendered as a slowly growing field of pixel flowers.",
        image: "/assets/projects/signal-garden.jpg",
        tags: &["generative", "radio", "installation"],
        featured: true,
    },
    Project {
        slug: "tape-loop-os",
        title: "Tape Loop OS",
        kind: "Software",
        year: 2023,
        summary: "A toy operating system whose only storage device is a cassette loop.",
        image: "/assets/projects/tape-loop-os.jpg",
        tags: &["systems", "audio", "retro"],
        featured: true,
    },
    Project {
        slug: "paper-cpu",
        title: "Paper CPU",
        kind: "Print",
        year: 2022,
        summary: "An 8-bit processor you execute with a pencil, printed as a risograph zine.",
        image: "/assets/projects/paper-cpu.jpg",
        tags: &["print", "education", "hardware"],
        featured: true,
    },
    Project {
        slug: "night-bus",
        title: "Night Bus",
        kind: "Photography",
        year: 2021,
        summary: "Long exposures from the last route of the night, one frame per stop.",
        image: "/assets/projects/night-bus.jpg",
        tags: &["photography", "city"],
        featured: false,
    },
    Project {
        slug: "glyph-kiln",
        title: "Glyph Kiln",
        kind: "Typeface",
        year: 2020,
        summary: "A bitmap typeface fired from ceramic tiles and scanned back in.",
        image: "/assets/projects/glyph-kiln.jpg",
        tags: &["type", "ceramics", "retro"],
        featured: false,
    },
];

/// Project whose slug is `slug`.
pub fn find_project(slug: &str) -> Option<&'static Project> {
    PROJECTS.iter().find(|project| project.slug == slug)
}

/// Case-insensitive match on title, kind and tags. A blank query matches everything.
pub fn filter_projects(query: &str) -> Vec<&'static Project> {
    let needle = query.trim().to_lowercase();
    PROJECTS
        .iter()
        .filter(|project| needle.is_empty() || project_matches(project, &needle))
        .collect()
}

pub(crate) fn project_matches(project: &Project, needle: &str) -> bool {
    project.title.to_lowercase().contains(needle)
        || project.kind.to_lowercase().contains(needle)
        || project.tags.iter().any(|tag| tag.contains(needle))
}
