// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where the pointer sits inside the drag preview.

use kurbo::{Point, Size, Vec2};

use crate::environment::Html5Environment;
use crate::interpolant::MonotonicInterpolant;
use crate::options::PreviewOptions;

/// Computes the offset passed to `setDragImage`.
///
/// With the default anchors the pointer keeps its relative position inside
/// the source; anchors of 0 or 1 dock the preview edge to the pointer instead,
/// and values in between are interpolated. Manual offsets in `options` win.
///
/// Image previews are measured by their own size since the browser draws them
/// unscaled; every other preview is assumed to match the source size.
pub fn drag_preview_offset<E: Html5Environment>(
    env: &E,
    source_node: &E::Node,
    preview: &E::Node,
    client_offset: Point,
    options: &PreviewOptions,
) -> Point {
    let image_size = env
        .image_size(preview)
        .filter(|_| env.is_firefox() || !env.is_in_document(preview));
    let is_image = image_size.is_some();
    let measured = if is_image { source_node } else { preview };
    let origin = env.client_offset(measured).unwrap_or(Point::ZERO);
    let from_preview: Vec2 = client_offset - origin;

    let source_size = env.offset_size(source_node);
    let safari_image = is_image && env.is_safari();
    let dpr = env.device_pixel_ratio();
    let mut preview_size = image_size.unwrap_or(source_size);
    if safari_image {
        preview_size = Size::new(preview_size.width / dpr, preview_size.height / dpr);
    }

    let x = options.offset_x.unwrap_or_else(|| {
        interpolate_axis(
            from_preview.x,
            source_size.width,
            preview_size.width,
            options.anchor_x,
        )
    });
    let y = options.offset_y.unwrap_or_else(|| {
        let mut y = interpolate_axis(
            from_preview.y,
            source_size.height,
            preview_size.height,
            options.anchor_y,
        );
        if safari_image {
            y += (dpr - 1.0) * preview_size.height;
        }
        y
    });
    Point::new(x, y)
}

/// Maps `anchor` over (start edge, scaled center, end edge) for one axis.
fn interpolate_axis(offset: f64, source_len: f64, preview_len: f64, anchor: f64) -> f64 {
    let scaled = if source_len == 0.0 {
        offset
    } else {
        offset / source_len * preview_len
    };
    MonotonicInterpolant::new(&[
        (0.0, offset),
        (0.5, scaled),
        (1.0, offset + preview_len - source_len),
    ])
    .interpolate(anchor)
}
