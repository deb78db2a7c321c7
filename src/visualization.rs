//! Visualization utilities for VRPTW solutions.
//!
//! Generates SVG drawings of routes and exports for plotting.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::instance::{VRPTWInstance, DEPOT};
use crate::solution::Solution;

const ROUTE_COLORS: [&str; 10] = [
    "#e74c3c", "#3498db", "#2ecc71", "#9b59b6", "#f39c12",
    "#1abc9c", "#d35400", "#34495e", "#c0392b", "#16a085",
];

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 5.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a solution
    pub fn generate_svg(&self, instance: &VRPTWInstance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #ecf0f1; stroke: #2c3e50; stroke-width: 1.5; }}
    .depot {{ fill: #2c3e50; stroke: #2c3e50; stroke-width: 2; }}
    .route {{ stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 9px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ffffff"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        let cost = solution
            .computed_cost
            .map(|c| format!("{:.1}", c))
            .unwrap_or_else(|| "-".to_string());
        let title = format!(
            "Instance: {} | Routes: {} | Cost: {} | Feasible: {}",
            instance.name,
            solution.num_routes(),
            cost,
            solution.feasible
        );
        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">{}</text>
"##,
            self.margin, title
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        for (k, route) in solution.routes.iter().enumerate() {
            let mut points: Vec<String> = Vec::with_capacity(route.len() + 2);
            let stops = std::iter::once(DEPOT)
                .chain(route.iter().copied().filter(|&n| n < instance.dimension))
                .chain(std::iter::once(DEPOT));
            for node in stops {
                let (x, y) = transform(instance.nodes[node].x, instance.nodes[node].y);
                points.push(format!("{:.2},{:.2}", x, y));
            }

            svg.push_str(&format!(
                r##"<polyline points="{}" class="route" stroke="{}"/>
"##,
                points.join(" "),
                ROUTE_COLORS[k % ROUTE_COLORS.len()]
            ));
        }

        for node in &instance.nodes {
            let (x, y) = transform(node.x, node.y);
            let class = if node.is_depot() { "depot" } else { "node" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            svg.push_str(&format!(
                r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                x,
                y - self.node_radius - 2.0,
                node.id
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Get coordinate bounds
    fn get_bounds(&self, instance: &VRPTWInstance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for node in &instance.nodes {
            min_x = min_x.min(node.x);
            max_x = max_x.max(node.x);
            min_y = min_y.min(node.y);
            max_y = max_y.max(node.y);
        }

        (min_x, max_x, min_y, max_y)
    }

    /// Export data for external plotting (e.g., matplotlib)
    pub fn export_plot_data(&self, instance: &VRPTWInstance, solution: &Solution) -> String {
        let mut data = String::new();

        data.push_str("# VRPTW Solution Data\n");
        data.push_str(&format!("# Instance: {}\n", instance.name));
        data.push_str(&format!("# Cost: {:?}\n", solution.computed_cost));
        data.push_str(&format!("# Feasible: {}\n\n", solution.feasible));

        data.push_str("# Nodes: id, x, y, demand, ready, due, service\n");
        for node in &instance.nodes {
            data.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                node.id,
                node.x,
                node.y,
                node.demand,
                node.ready_time,
                node.due_date,
                node.service_time
            ));
        }

        data.push_str("\n# Routes: one per line\n");
        for route in &solution.routes {
            let ids: Vec<String> = route.iter().map(|n| n.to_string()).collect();
            data.push_str(&ids.join(","));
            data.push('\n');
        }

        data
    }
}
