//! Plot rendering using egui_plot
//!
//! [`PlotData`] collects samples from the bus, one series per channel id.
//! [`PlotView`] draws them with the scaling chosen in the lifecycle store
//! and reports user interaction back to the app.
//!
//! # Main Types
//!
//! - [`PlotData`] - Sample series fed by data and channel events
//! - [`PlotView`] - Rendering and interaction state
//! - [`AxisSettings`] - Axis modes and limits for one frame

use std::collections::{HashMap, VecDeque};

use egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text, VLine};

use crate::events::{ChangeEvent, ChannelEvent, DataEvent};
use crate::model::ChannelRegistry;
use crate::types::{Channel, ChannelId, Note, Rgb, SampleBatch, XAxisMode, YAxisMode};

/// Points kept per series before the oldest are dropped
pub const MAX_POINTS_PER_SERIES: usize = 200_000;

/// Sample series in plot coordinates: seconds since the first sample
#[derive(Debug, Clone)]
pub struct PlotData {
    series: HashMap<ChannelId, VecDeque<[f64; 2]>>,
    origin_ms: Option<i64>,
    max_points: usize,
}

impl Default for PlotData {
    fn default() -> Self {
        Self::with_limit(MAX_POINTS_PER_SERIES)
    }
}

impl PlotData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_points: usize) -> Self {
        Self {
            series: HashMap::new(),
            origin_ms: None,
            max_points: max_points.max(1),
        }
    }

    /// Apply a bus event.
    ///
    /// Sample batches hold one result per active channel, in active order at
    /// the time they are routed. A channel that is removed, deactivated or
    /// gets a new transform loses its series.
    pub fn handle(&mut self, event: &ChangeEvent, channels: &ChannelRegistry) {
        match event {
            ChangeEvent::Data(DataEvent::SamplesReceived(batch)) => {
                self.ingest(&channels.active_ids(), batch);
            }
            ChangeEvent::Data(DataEvent::Cleared) => self.clear(),
            ChangeEvent::Channel(ChannelEvent::Removed(id))
            | ChangeEvent::Channel(ChannelEvent::TransformChanged(id)) => self.forget(*id),
            ChangeEvent::Channel(ChannelEvent::ActiveChanged(id)) => {
                if !channels.is_active(*id) {
                    self.forget(*id);
                }
            }
            _ => {}
        }
    }

    /// Append a batch whose results belong to `ids`, position by position
    pub fn ingest(&mut self, ids: &[ChannelId], batch: &SampleBatch) {
        if ids.len() != batch.results.len() {
            tracing::debug!(
                channels = ids.len(),
                results = batch.results.len(),
                "sample batch does not match the active channels"
            );
        }
        let origin = *self.origin_ms.get_or_insert(batch.timestamp_ms);
        let t = (batch.timestamp_ms - origin) as f64 / 1000.0;

        for (id, (ok, value)) in ids.iter().zip(&batch.results) {
            if !*ok {
                continue;
            }
            let series = self.series.entry(*id).or_default();
            if series.len() == self.max_points {
                series.pop_front();
            }
            series.push_back([t, *value]);
        }
    }

    /// Drop the series of one channel
    pub fn forget(&mut self, id: ChannelId) {
        if self.series.remove(&id).is_some() {
            tracing::debug!(channel = %id, "plot series dropped");
        }
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.origin_ms = None;
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(VecDeque::is_empty)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Points of one channel, oldest first
    pub fn points(&self, id: ChannelId) -> Vec<[f64; 2]> {
        self.series
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn last_value(&self, id: ChannelId) -> Option<f64> {
        self.series.get(&id).and_then(VecDeque::back).map(|p| p[1])
    }

    /// Time of the newest point in any series
    pub fn latest_time(&self) -> f64 {
        self.series
            .values()
            .filter_map(VecDeque::back)
            .map(|p| p[0])
            .fold(0.0, f64::max)
    }

    /// Value range of the given series within `x_range`, if any point falls in it
    pub fn value_range(&self, ids: &[ChannelId], x_range: Option<(f64, f64)>) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for series in ids.iter().filter_map(|id| self.series.get(id)) {
            for [t, v] in series {
                if let Some((lo, hi)) = x_range {
                    if *t < lo || *t > hi {
                        continue;
                    }
                }
                range = Some(match range {
                    Some((min, max)) => (min.min(*v), max.max(*v)),
                    None => (*v, *v),
                });
            }
        }
        range
    }
}

/// One curve to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub id: ChannelId,
    /// Active position, as used by the bring-to-front selection
    pub position: usize,
    pub label: String,
    pub color: Rgb,
}

/// Curves for the visible active channels, front channel drawn last
pub fn plot_lines(channels: &[Channel], front: Option<usize>) -> Vec<PlotLine> {
    let mut lines: Vec<PlotLine> = channels
        .iter()
        .filter(|c| c.active)
        .enumerate()
        .filter(|(_, c)| c.visible)
        .map(|(position, c)| PlotLine {
            id: c.id,
            position,
            label: c.label.clone(),
            color: c.color,
        })
        .collect();

    if let Some(front) = front {
        if let Some(idx) = lines.iter().position(|l| l.position == front) {
            let line = lines.remove(idx);
            lines.push(line);
        }
    }
    lines
}

/// Axis scaling for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSettings {
    pub x_mode: XAxisMode,
    pub x_sliding_secs: u32,
    pub y_mode: YAxisMode,
    pub y_min: f64,
    pub y_max: f64,
}

/// Bounds to force for each axis; `None` leaves the axis as it is
pub fn axis_bounds(
    data: &PlotData,
    ids: &[ChannelId],
    axes: &AxisSettings,
) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
    let latest = data.latest_time();
    let x = match axes.x_mode {
        XAxisMode::Auto => (!data.is_empty()).then_some((0.0, latest.max(f64::EPSILON))),
        XAxisMode::Sliding => {
            let window = f64::from(axes.x_sliding_secs.max(1));
            let max = latest.max(window);
            Some((max - window, max))
        }
        XAxisMode::Manual => None,
    };

    let pad = |(lo, hi): (f64, f64)| {
        let span = hi - lo;
        let padding = if span > 0.0 { span * 0.05 } else { 1.0 };
        (lo - padding, hi + padding)
    };
    let y = match axes.y_mode {
        YAxisMode::Auto => data.value_range(ids, None).map(pad),
        YAxisMode::WindowAuto | YAxisMode::Sliding => data.value_range(ids, x).map(pad),
        YAxisMode::MinMax => Some((axes.y_min, axes.y_max)),
        YAxisMode::Manual => None,
    };
    (x, y)
}

/// Everything the plot needs from the stores for one frame
pub struct PlotContext<'a> {
    pub lines: &'a [PlotLine],
    pub notes: &'a [Note],
    pub axes: AxisSettings,
    pub cursor_active: bool,
    pub highlight_samples: bool,
    pub markers_active: bool,
}

/// What the user did to the plot this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOutput {
    /// Plot coordinates of a secondary click, for the context menu
    pub context_point: Option<[f64; 2]>,
    /// A marker was placed
    pub marker_placed: bool,
    /// The user dragged or zoomed the x axis
    pub x_interacted: bool,
    /// The user dragged or zoomed the y axis
    pub y_interacted: bool,
}

/// Plot view state kept between frames
#[derive(Debug, Default)]
pub struct PlotView {
    /// X positions of placed markers, at most two
    markers: Vec<f64>,
    /// Point where the context menu was opened
    context_point: Option<[f64; 2]>,
    pub line_width: f32,
}

impl PlotView {
    pub fn new() -> Self {
        Self {
            line_width: 1.5,
            ..Self::default()
        }
    }

    pub fn markers(&self) -> &[f64] {
        &self.markers
    }

    pub fn context_point(&self) -> Option<[f64; 2]> {
        self.context_point
    }

    fn place_marker(&mut self, x: f64) {
        if self.markers.len() == 2 {
            self.markers.remove(0);
        }
        self.markers.push(x);
    }

    /// Render the plot. The context menu body is drawn by `context_menu`.
    pub fn render(
        &mut self,
        ui: &mut Ui,
        data: &PlotData,
        ctx: &PlotContext<'_>,
        context_menu: impl FnOnce(&mut Ui),
    ) -> PlotOutput {
        let mut output = PlotOutput::default();

        if !ctx.markers_active {
            self.markers.clear();
        }

        let ids: Vec<ChannelId> = ctx.lines.iter().map(|l| l.id).collect();
        let (x_bounds, y_bounds) = axis_bounds(data, &ids, &ctx.axes);
        let x_free = ctx.axes.x_mode == XAxisMode::Manual;
        let y_free = ctx.axes.y_mode == YAxisMode::Manual;

        let plot = Plot::new("acquisition_plot")
            .legend(Legend::default().position(Corner::RightTop).background_alpha(0.8))
            .show_axes(true)
            .show_grid(true)
            .x_axis_label("Time (s)")
            .allow_boxed_zoom(x_free || y_free)
            .allow_zoom([x_free, y_free])
            .allow_drag([x_free, y_free])
            .allow_scroll([x_free, y_free])
            .auto_bounds([false, false]);

        let markers = self.markers.clone();
        let line_width = self.line_width;
        let response = plot.show(ui, |plot_ui| {
            if x_bounds.is_some() || y_bounds.is_some() {
                let current = plot_ui.plot_bounds();
                let (x_min, x_max) = x_bounds.unwrap_or((current.min()[0], current.max()[0]));
                let (y_min, y_max) = y_bounds.unwrap_or((current.min()[1], current.max()[1]));
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
            }

            for line in ctx.lines {
                let points = data.points(line.id);
                if points.is_empty() {
                    continue;
                }
                let color = line.color.to_color32();
                plot_ui.line(
                    Line::new(line.label.clone(), PlotPoints::from(points.clone()))
                        .color(color)
                        .width(line_width),
                );
                if ctx.highlight_samples {
                    plot_ui.points(
                        Points::new(line.label.clone(), PlotPoints::from(points))
                            .color(color)
                            .radius(2.0),
                    );
                }
            }

            for note in ctx.notes {
                plot_ui.text(
                    Text::new("notes", PlotPoint::new(note.key, note.value), note.text.clone())
                        .color(Color32::LIGHT_YELLOW),
                );
            }

            for (i, x) in markers.iter().enumerate() {
                plot_ui.vline(
                    VLine::new(format!("marker_{}", i + 1), *x)
                        .color(Color32::from_rgb(255, 170, 0))
                        .width(1.0),
                );
            }

            if ctx.cursor_active {
                if let Some(pointer) = plot_ui.pointer_coordinate() {
                    plot_ui.vline(
                        VLine::new("cursor", pointer.x)
                            .color(Color32::from_rgba_unmultiplied(255, 255, 255, 96))
                            .width(1.0),
                    );
                }
            }
        });

        let plot_response = &response.response;
        if plot_response.dragged() || (plot_response.hovered() && ui.input(|i| i.raw_scroll_delta != egui::Vec2::ZERO)) {
            output.x_interacted = true;
            output.y_interacted = true;
        }

        if plot_response.double_clicked() {
            if let Some(pos) = plot_response.interact_pointer_pos() {
                let point = response.transform.value_from_position(pos);
                self.place_marker(point.x);
                output.marker_placed = true;
            }
        }

        if plot_response.secondary_clicked() {
            if let Some(pos) = plot_response.interact_pointer_pos() {
                let point = response.transform.value_from_position(pos);
                self.context_point = Some([point.x, point.y]);
                output.context_point = self.context_point;
            }
        }

        plot_response.context_menu(context_menu);
        output
    }
}
