#![cfg(feature = "web")]
use crate::status::{StatusCategory, StatusTally};
use plotters::prelude::*;

/// Configuration options for the status chart
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the graph
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Ações por OKR e Status".to_string(),
            x_label: "OKR".to_string(),
            y_label: "Quantidade de ações".to_string(),
            width: 900,
            height: 420,
        }
    }
}

/// One stacked block of a bar: `count` actions of `category` sitting on top
/// of `base` actions of earlier categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackSegment {
    pub bar: usize,
    pub category: usize,
    pub base: usize,
    pub count: usize,
}

/// Bars (one per objective), legend entries, and the blocks to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackedBars {
    pub bars: Vec<String>,
    pub categories: Vec<String>,
    pub segments: Vec<StackSegment>,
}

impl StackedBars {
    pub fn from_tally(tally: &StatusTally) -> Self {
        let bars: Vec<String> = tally.objectives().into_iter().map(String::from).collect();
        let order: Vec<&StatusCategory> = tally.categories();
        let categories = order.iter().map(|c| c.label().to_string()).collect();

        let mut segments = Vec::new();
        for (bar, objective) in bars.iter().enumerate() {
            let mut base = 0;
            for (category, status) in order.iter().enumerate() {
                let count: usize = tally
                    .counts
                    .iter()
                    .filter(|c| &c.objective == objective && &c.category == *status)
                    .map(|c| c.count)
                    .sum();
                if count > 0 {
                    segments.push(StackSegment {
                        bar,
                        category,
                        base,
                        count,
                    });
                    base += count;
                }
            }
        }

        StackedBars {
            bars,
            categories,
            segments,
        }
    }

    pub fn max_height(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.base + s.count)
            .max()
            .unwrap_or(0)
    }
}

fn category_color(category: &str, index: usize) -> RGBColor {
    match category {
        "Concluída" => RGBColor(34, 139, 34),
        "Em andamento" => RGBColor(30, 110, 200),
        "Pendente" => RGBColor(230, 160, 30),
        "Sem status" => RGBColor(150, 150, 150),
        _ => {
            let c = Palette99::pick(index).to_rgba();
            RGBColor(c.0, c.1, c.2)
        }
    }
}

/// Renders the tally as a stacked bar chart in SVG.
///
/// # Returns
/// * `Ok(None)` when there is nothing to draw, otherwise the SVG document
pub fn create_status_chart(
    tally: &StatusTally,
    options: &GraphOptions,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let stacked = StackedBars::from_tally(tally);
    if stacked.segments.is_empty() {
        return Ok(None);
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let n = stacked.bars.len() as f64;
        let y_max = stacked.max_height() as f64 * 1.1 + 1.0;
        let bars = &stacked.bars;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..n - 0.5, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len() * 2 + 1)
            .x_label_formatter(&|x| {
                let nearest = x.round();
                if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
                    return String::new();
                }
                bars.get(nearest as usize).cloned().unwrap_or_default()
            })
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .draw()?;

        for (index, category) in stacked.categories.iter().enumerate() {
            let color = category_color(category, index);
            chart
                .draw_series(
                    stacked
                        .segments
                        .iter()
                        .filter(|s| s.category == index)
                        .map(|s| {
                            let x = s.bar as f64;
                            Rectangle::new(
                                [
                                    (x - 0.35, s.base as f64),
                                    (x + 0.35, (s.base + s.count) as f64),
                                ],
                                color.filled(),
                            )
                        }),
                )?
                .label(category.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(Some(svg))
}
