//! The built-in task graph.

use crate::graph::{Step, Task, TaskGraph};
use crate::ops::context::TaskContext;
use crate::ops::{assets, bundles, clean, generate, inject, lint};

/// Task run when none is named.
pub const DEFAULT_TASK: &str = "default";

/// Every built-in task with its prerequisites.
pub fn standard_graph() -> TaskGraph<TaskContext> {
    let mut graph = TaskGraph::new();

    graph
        .add(
            Task::new("styles")
                .describe("Compile, combine and optimize style bundles")
                .depends_on(["sasslint", "wiredep"])
                .action(|ctx: &TaskContext| bundles::styles(ctx).map(drop)),
        )
        .add(
            Task::new("scripts")
                .describe("Transpile, combine and optimize script bundles")
                .depends_on(["jslint"])
                .action(|ctx: &TaskContext| bundles::scripts(ctx).map(drop)),
        )
        .add(
            Task::new("fonts")
                .describe("Copy fonts into a flat directory")
                .action(|ctx: &TaskContext| assets::fonts(ctx).map(drop)),
        )
        .add(
            Task::new("images")
                .describe("Optimize images")
                .action(|ctx: &TaskContext| assets::images(ctx).map(drop)),
        )
        .add(
            Task::new("videos")
                .describe("Copy videos")
                .action(|ctx: &TaskContext| assets::videos(ctx).map(drop)),
        )
        .add(
            Task::new("favicons")
                .describe("Generate favicon files")
                .action(|ctx: &TaskContext| generate::favicons(ctx).map(drop)),
        )
        .add(
            Task::new("icons")
                .describe("Combine SVG icons into a symbol sprite")
                .action(|ctx: &TaskContext| generate::icons(ctx).map(drop)),
        )
        .add(
            Task::new("jslint")
                .alias("lint-scripts")
                .describe("Lint project scripts")
                .action(lint::jslint),
        )
        .add(
            Task::new("sasslint")
                .alias("lint-styles")
                .describe("Lint Sass sources")
                .action(lint::sasslint),
        )
        .add(
            Task::new("wiredep")
                .alias("inject")
                .describe("Inject vendor style imports into style sources")
                .action(|ctx: &TaskContext| inject::wiredep(ctx).map(drop)),
        )
        .add(
            Task::new("clean")
                .describe("Delete the output directory")
                .action(|ctx: &TaskContext| clean::clean(ctx).map(drop)),
        )
        .add(
            Task::new("build")
                .describe("Build every asset")
                .series(vec![
                    Step::Task("styles".into()),
                    Step::Task("scripts".into()),
                    Step::Parallel(vec![
                        "fonts".into(),
                        "images".into(),
                        "videos".into(),
                        "favicons".into(),
                    ]),
                ]),
        )
        .add(
            Task::new(DEFAULT_TASK)
                .describe("Clean, then build")
                .series(vec![Step::Task("clean".into()), Step::Task("build".into())]),
        );

    graph
}
