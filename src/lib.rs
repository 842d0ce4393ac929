use chrono::Utc;
use enclose::enc;
use seed::browser::fetch::{fetch, Request, Response};
use seed::{prelude::*, *};
use web_sys::HtmlCanvasElement;

pub mod config;
pub mod error;
pub mod grade;
pub mod report;
pub mod roster;
pub mod scoring;
pub mod source;
mod util;

use config::ReportConfig;
use error::{Error, LoadError, ScoringError};
use report::{Dashboard, LearnerReport};
use roster::Roster;
use scoring::{ClassTable, Tally};

const REPORT_ID: &str = "report";
const QUERY_KEYS: [&str; 5] = ["data", "scale", "max", "missing", "unrecognized"];

// ------ ------
//     Model
// ------ ------

// ------ Model ------

struct Model {
    config: ReportConfig,
    state: LoadState,
    generated_on: String,
    refs: Refs,
}

enum LoadState {
    Loading,
    Failed(String),
    NoData,
    Ready(Dashboard),
}

#[derive(Default)]
struct Refs {
    chart_canvas: ElRef<HtmlCanvasElement>,
}

// ------ ------
//     Init
// ------ ------

fn init(url: Url, orders: &mut impl Orders<Msg>) -> Model {
    let overrides = QUERY_KEYS.iter().filter_map(|key| {
        url.search()
            .get(*key)
            .and_then(|values| values.last())
            .map(|value| (*key, value.clone()))
    });

    let (config, state) = match ReportConfig::default().with_overrides(overrides) {
        Ok(config) => {
            let data_url = config.data_url.clone();
            orders.perform_cmd(async move { Msg::RosterFetched(fetch_roster(data_url).await) });
            (config, LoadState::Loading)
        }
        Err(err) => {
            error!("invalid report configuration:", err.to_string());
            (ReportConfig::default(), LoadState::Failed(err.to_string()))
        }
    };

    Model {
        config,
        state,
        generated_on: util::generated_on(Utc::now()),
        refs: Refs::default(),
    }
}

async fn fetch_roster(url: String) -> Result<Roster, LoadError> {
    let response = fetch(Request::new(url))
        .await
        .and_then(Response::check_status)
        .map_err(|err| LoadError::Fetch(format!("{:?}", err)))?;
    let text = response
        .text()
        .await
        .map_err(|err| LoadError::Fetch(format!("{:?}", err)))?;

    source::parse_roster(&text)
}

// ------ ------
//    Update
// ------ ------

enum Msg {
    RosterFetched(Result<Roster, LoadError>),
    LearnerSelected(String),
    ExportRequested,

    NoOp,
}

fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::RosterFetched(Ok(roster)) => {
            model.state = match Dashboard::build(roster, &model.config) {
                Ok(dashboard) => {
                    log!("loaded learners:", dashboard.roster().len());
                    for diagnostic in &dashboard.diagnostics {
                        log!(
                            "unrecognized grade scored as 0:",
                            diagnostic.learner,
                            diagnostic.subject,
                            diagnostic.value
                        );
                    }
                    LoadState::Ready(dashboard)
                }
                Err(Error::Scoring(err @ ScoringError::EmptyRoster))
                | Err(Error::Scoring(err @ ScoringError::NoSubjects)) => {
                    log!("nothing to report:", err.to_string());
                    LoadState::NoData
                }
                Err(err) => {
                    error!("could not build report:", err.to_string());
                    LoadState::Failed(err.to_string())
                }
            };
            schedule_chart(model, orders);
        }
        Msg::RosterFetched(Err(err)) => {
            error!("data loading error:", err.to_string());
            model.state = LoadState::Failed(err.to_string());
        }

        Msg::LearnerSelected(id) => {
            if let LoadState::Ready(dashboard) = &mut model.state {
                if let Err(err) = dashboard.select(&id) {
                    error!(err.to_string());
                }
            }
            schedule_chart(model, orders);
        }

        Msg::ExportRequested => {
            if let LoadState::Ready(dashboard) = &model.state {
                exportReportPdf(
                    REPORT_ID,
                    &format!("Learner: {}", dashboard.export_title()),
                    &dashboard.export_file_name(),
                );
            }
        }

        Msg::NoOp => (),
    }
}

/// Redraws the chart once the canvas for the current selection is in the DOM.
fn schedule_chart(model: &Model, orders: &mut impl Orders<Msg>) {
    if let LoadState::Ready(dashboard) = &model.state {
        if let Some(report) = dashboard.selected_report() {
            let canvas = model.refs.chart_canvas.clone();
            let max_score = dashboard.scale().max_score();
            orders.after_next_render(move |_| {
                draw_chart(&canvas, &report, max_score);
                Msg::NoOp
            });
        }
    }
}

fn draw_chart(canvas: &ElRef<HtmlCanvasElement>, report: &LearnerReport, max_score: f64) {
    let canvas = match canvas.get() {
        Some(canvas) => canvas,
        None => {
            error!("chart canvas is not mounted");
            return;
        }
    };

    match (
        serde_json::to_string(&report.labels),
        serde_json::to_string(&report.values),
    ) {
        (Ok(labels), Ok(values)) => renderSubjectChart(&canvas, &labels, &values, max_score),
        _ => error!("could not encode chart series for", report.name),
    }
}

// ------ ------
//     View
// ------ ------

fn view(model: &Model) -> Node<Msg> {
    div![
        C!["dashboard"],
        view_header(),
        match &model.state {
            LoadState::Loading => p![C!["status"], "Loading learners..."],
            LoadState::Failed(message) => p![C!["status", "error"], message.as_str()],
            LoadState::NoData => p![C!["status"], "No learner data available."],
            LoadState::Ready(dashboard) => {
                view_dashboard(dashboard, &model.refs, &model.generated_on)
            }
        }
    ]
}

// ------ header ------

fn view_header() -> Node<Msg> {
    header![C!["header"], h1!["CBC Grade Report"]]
}

// ------ dashboard ------

fn view_dashboard(dashboard: &Dashboard, refs: &Refs, generated_on: &str) -> Node<Msg> {
    let selected = dashboard.selected();

    section![
        C!["main"],
        div![
            C!["controls"],
            view_learner_select(dashboard),
            button![
                id!("exportBtn"),
                ev(Ev::Click, |_| Msg::ExportRequested),
                "Export PDF"
            ],
        ],
        div![
            id!(REPORT_ID),
            p![C!["generated"], generated_on],
            canvas![id!("subjectChart"), el_ref(&refs.chart_canvas)],
            match selected {
                Some(learner) => view_summary(&dashboard.learner_report(learner)),
                None => p![C!["status"], "Select a learner."],
            },
        ],
        view_class_table(&dashboard.class_table, selected.map(|l| l.id())),
        view_tally(&dashboard.tally),
        view_bands(dashboard),
    ]
}

fn view_learner_select(dashboard: &Dashboard) -> Node<Msg> {
    let selected = dashboard.selected().map(|l| l.id());

    select![
        id!("learnerSelect"),
        input_ev(Ev::Change, Msg::LearnerSelected),
        dashboard.roster().learners().iter().map(|learner| {
            option![
                attrs! {
                    At::Value => learner.name.as_str();
                    At::Selected => (selected == Some(learner.id())).as_at_value();
                },
                learner.name.as_str()
            ]
        })
    ]
}

// ------ summary ------

fn view_summary(report: &LearnerReport) -> Node<Msg> {
    div![
        C!["summary"],
        h2![report.name.as_str()],
        ul![
            id!("summary"),
            report.lines.iter().map(|line| {
                li![format!(
                    "{}: {} ({})",
                    line.subject,
                    line.grade,
                    util::format_score(line.score)
                )]
            })
        ],
        p![
            C!["total"],
            format!(
                "Total: {} / {} ({:.1}%)",
                util::format_score(report.total),
                util::format_score(report.max_total),
                report.percentage
            )
        ],
    ]
}

// ------ class table ------

fn view_class_table(table: &ClassTable, selected: Option<&str>) -> Node<Msg> {
    section![
        C!["class-results"],
        h2!["Class results"],
        table![
            thead![tr![
                th!["Subject"],
                table.learners.iter().map(|name| {
                    th![
                        C!["learner", IF!(selected == Some(name.as_str()) => "selected")],
                        ev(
                            Ev::Click,
                            enc!((name) move |_| Msg::LearnerSelected(name))
                        ),
                        name.as_str()
                    ]
                })
            ]],
            tbody![
                table.rows.iter().map(|row| {
                    tr![
                        td![row.subject.as_str()],
                        row.cells.iter().map(|cell| {
                            td![
                                C![IF!(cell.missing => "missing")],
                                util::format_score(cell.score)
                            ]
                        })
                    ]
                }),
                tr![
                    C!["total"],
                    td!["Total"],
                    table
                        .totals
                        .iter()
                        .map(|total| td![util::format_score(*total)])
                ],
            ]
        ]
    ]
}

// ------ tally ------

fn view_tally(tally: &Tally) -> Node<Msg> {
    section![
        C!["grade-tally"],
        h2!["Grade tally"],
        table![
            thead![tr![
                th!["Subject"],
                tally.codes.iter().map(|code| th![code.as_str()]),
                th!["Ungraded"],
            ]],
            tbody![tally.rows.iter().map(|row| {
                tr![
                    td![row.subject.as_str()],
                    row.counts.iter().map(|count| td![count.to_string()]),
                    td![row.ungraded.to_string()],
                ]
            })]
        ]
    ]
}

// ------ bands ------

fn view_bands(dashboard: &Dashboard) -> Node<Msg> {
    section![
        C!["performance-summary"],
        h2!["Performance summary"],
        table![
            thead![tr![
                th!["Learner"],
                grade::Band::ALL.iter().map(|band| th![band.label()]),
                th!["Other"],
            ]],
            tbody![dashboard.bands.iter().map(|row| {
                tr![
                    td![row.learner.as_str()],
                    row.counts.iter().map(|count| td![count.to_string()]),
                    td![row.other.to_string()],
                ]
            })]
        ]
    ]
}

#[wasm_bindgen]
extern "C" {
    fn renderSubjectChart(canvas: &HtmlCanvasElement, labels: &str, values: &str, max: f64);
    fn exportReportPdf(element_id: &str, title: &str, file_name: &str);
}

// ------ ------
//     Start
// ------ ------

#[wasm_bindgen(start)]
pub fn render() {
    App::start("app", init, update, view);
}
