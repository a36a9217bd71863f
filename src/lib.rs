/*!
# OKR Monitor

A single-page dashboard for following the execution of a strategic plan:
objectives (OKRs), key results (KRs), actions and indicators (KPIs), all read
from one spreadsheet workbook.

## Overview

The workbook holds five sheets: `OKRs`, `KRs`, `KPIs`, the `OKR_KPI` link
table and `Ações_KR`. They are loaded once per distinct file into an
immutable [`Dataset`]. Every interaction then re-derives the page from that
snapshot:

1. **Load** - the workbook bytes are fingerprinted and parsed at most once
   ([`cache`]).
2. **Filter** - the pinned row, if any, narrows the other three tables to the
   rows related to it ([`filter`]).
3. **Lay out** - columns are projected, ordered, labelled and sized from
   `column_layout.json` ([`layout`]).
4. **Summarize** - action statuses are bucketed and counted per objective
   ([`status`]), and drawn as a stacked bar chart.

## Drill-down

Clicking a row pins it; clicking it again unpins it. Only one row across the
four tables is pinned at a time ([`selection`]).

| Pinned | Objectives | Key results | Actions | Indicators |
|---|---|---|---|---|
| objective | itself | its KRs | actions counted towards it | linked KPIs |
| key result | its objective | itself | actions using it | linked KPIs |
| action | its objective | its KR | itself | KPIs linked to its KR |
| indicator | linked OKRs | linked KRs | actions using a linked KR | itself |

## Modules

- **table**: named-column string table with defensive column access
- **workbook**: sheet reading and normalization
- **filter**: cross-table drill-down
- **selection**: the four mutually exclusive selection slots
- **status**: status buckets and per-objective tally
- **layout**: column layout file
- **cache**: content-addressed dataset cache
- **dashboard**: one interaction turn, from load to page model
- **html**: page rendering
- **graph**: status chart (feature `web`)
- **app**: HTTP routes (feature `web`)
*/

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod html;
pub mod layout;
pub mod selection;
pub mod status;
pub mod table;
pub mod workbook;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;

pub use cache::WorkbookCache;
pub use config::Settings;
pub use dashboard::{Dashboard, DashboardPage, TableView};
pub use error::LoadError;
pub use filter::{Selection, Views, filter_views};
pub use selection::{Entity, SelectionState};
pub use status::{StatusCategory, StatusTally, normalize_status, tally_actions};
pub use table::Table;
pub use workbook::{Dataset, load_workbook, load_workbook_bytes};
