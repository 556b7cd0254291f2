//! Dynamic rendering helpers (Vulkan 1.3, no VkRenderPass objects).
//!
//! [`RenderingConfig`] describes one color attachment and an optional depth
//! attachment; [`RenderingConfig::build`] produces a [`RenderingInfoBundle`]
//! whose backing arrays outlive the `vk::RenderingInfo` handed to
//! `begin_rendering`.

use ash::vk;

/// Color attachment configuration for dynamic rendering.
///
/// Defaults to CLEAR/STORE in COLOR_ATTACHMENT_OPTIMAL with a black clear.
#[derive(Clone)]
pub struct ColorAttachment {
    pub image_view: vk::ImageView,
    pub layout: vk::ImageLayout,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub clear_value: vk::ClearColorValue,
}

impl ColorAttachment {
    #[inline]
    pub fn new(image_view: vk::ImageView) -> Self {
        Self {
            image_view,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::STORE,
            clear_value: vk::ClearColorValue {
                float32: [0.0, 0.0, 0.0, 1.0],
            },
        }
    }

    /// Clear color as [R, G, B, A] floats in [0.0, 1.0].
    #[inline]
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_value = vk::ClearColorValue { float32: color };
        self
    }

    /// Preserve existing contents instead of clearing.
    #[inline]
    pub fn load(mut self) -> Self {
        self.load_op = vk::AttachmentLoadOp::LOAD;
        self
    }

    #[inline]
    pub fn to_rendering_attachment_info(&self) -> vk::RenderingAttachmentInfo<'static> {
        vk::RenderingAttachmentInfo::default()
            .image_view(self.image_view)
            .image_layout(self.layout)
            .load_op(self.load_op)
            .store_op(self.store_op)
            .clear_value(vk::ClearValue {
                color: self.clear_value,
            })
    }
}

impl std::fmt::Debug for ColorAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ClearColorValue is a union; show the float32 variant.
        let clear_color = unsafe { self.clear_value.float32 };
        f.debug_struct("ColorAttachment")
            .field("image_view", &self.image_view)
            .field("layout", &self.layout)
            .field("load_op", &self.load_op)
            .field("store_op", &self.store_op)
            .field("clear_value", &clear_color)
            .finish()
    }
}

/// Depth attachment configuration for dynamic rendering.
///
/// Defaults to CLEAR to depth 1.0 (far plane) and DONT_CARE on store, since
/// the depth buffer is only consumed within the pass.
#[derive(Clone, Debug)]
pub struct DepthAttachment {
    pub image_view: vk::ImageView,
    pub layout: vk::ImageLayout,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub clear_value: vk::ClearDepthStencilValue,
}

impl DepthAttachment {
    #[inline]
    pub fn new(image_view: vk::ImageView) -> Self {
        Self {
            image_view,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::DONT_CARE,
            clear_value: vk::ClearDepthStencilValue {
                depth: 1.0,
                stencil: 0,
            },
        }
    }

    #[inline]
    pub fn with_clear_depth(mut self, depth: f32) -> Self {
        self.clear_value.depth = depth;
        self
    }

    #[inline]
    pub fn to_rendering_attachment_info(&self) -> vk::RenderingAttachmentInfo<'static> {
        vk::RenderingAttachmentInfo::default()
            .image_view(self.image_view)
            .image_layout(self.layout)
            .load_op(self.load_op)
            .store_op(self.store_op)
            .clear_value(vk::ClearValue {
                depth_stencil: self.clear_value,
            })
    }
}

/// Attachments and render area for one `vkCmdBeginRendering` call.
#[derive(Clone, Debug)]
pub struct RenderingConfig {
    pub color_attachment: ColorAttachment,
    pub depth_attachment: Option<DepthAttachment>,
    pub render_area: vk::Rect2D,
}

impl RenderingConfig {
    #[inline]
    pub fn new(extent: vk::Extent2D, color_attachment: ColorAttachment) -> Self {
        Self {
            color_attachment,
            depth_attachment: None,
            render_area: vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
        }
    }

    #[inline]
    pub fn with_depth_attachment(mut self, attachment: DepthAttachment) -> Self {
        self.depth_attachment = Some(attachment);
        self
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.render_area.extent
    }

    pub fn build(&self) -> RenderingInfoBundle {
        RenderingInfoBundle::new(self)
    }
}

/// Owns the attachment info arrays a `vk::RenderingInfo` borrows from.
pub struct RenderingInfoBundle {
    color_attachments: [vk::RenderingAttachmentInfo<'static>; 1],
    depth_attachment: Option<vk::RenderingAttachmentInfo<'static>>,
    render_area: vk::Rect2D,
}

impl RenderingInfoBundle {
    pub fn new(config: &RenderingConfig) -> Self {
        Self {
            color_attachments: [config.color_attachment.to_rendering_attachment_info()],
            depth_attachment: config
                .depth_attachment
                .as_ref()
                .map(|a| a.to_rendering_attachment_info()),
            render_area: config.render_area,
        }
    }

    /// `vk::RenderingInfo` referencing this bundle's data; valid for as long
    /// as the bundle lives.
    pub fn info(&self) -> vk::RenderingInfo<'_> {
        let mut info = vk::RenderingInfo::default()
            .render_area(self.render_area)
            .layer_count(1)
            .color_attachments(&self.color_attachments);

        if let Some(ref depth) = self.depth_attachment {
            info = info.depth_attachment(depth);
        }

        info
    }

    #[inline]
    pub fn render_area(&self) -> vk::Rect2D {
        self.render_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENT: vk::Extent2D = vk::Extent2D {
        width: 1700,
        height: 900,
    };

    #[test]
    fn color_attachment_defaults_to_clear_store() {
        let attachment = ColorAttachment::new(vk::ImageView::null());
        assert_eq!(attachment.layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(attachment.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(attachment.store_op, vk::AttachmentStoreOp::STORE);

        let clear = unsafe { attachment.clear_value.float32 };
        assert_eq!(clear, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn color_attachment_load_preserves_contents() {
        let attachment = ColorAttachment::new(vk::ImageView::null()).load();
        assert_eq!(attachment.load_op, vk::AttachmentLoadOp::LOAD);
    }

    #[test]
    fn depth_attachment_clears_to_far_plane() {
        let attachment = DepthAttachment::new(vk::ImageView::null());
        assert_eq!(
            attachment.layout,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        );
        assert_eq!(attachment.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(attachment.store_op, vk::AttachmentStoreOp::DONT_CARE);
        assert_eq!(attachment.clear_value.depth, 1.0);
        assert_eq!(attachment.clear_value.stencil, 0);
    }

    #[test]
    fn config_covers_full_extent_at_origin() {
        let config = RenderingConfig::new(EXTENT, ColorAttachment::new(vk::ImageView::null()));
        assert_eq!(config.render_area.offset.x, 0);
        assert_eq!(config.render_area.offset.y, 0);
        assert_eq!(config.extent().width, 1700);
        assert_eq!(config.extent().height, 900);
        assert!(config.depth_attachment.is_none());
    }

    #[test]
    fn bundle_carries_color_and_depth() {
        let config = RenderingConfig::new(
            EXTENT,
            ColorAttachment::new(vk::ImageView::null()).with_clear_color([0.1, 0.2, 0.3, 1.0]),
        )
        .with_depth_attachment(DepthAttachment::new(vk::ImageView::null()).with_clear_depth(1.0));

        let bundle = config.build();
        let info = bundle.info();

        assert_eq!(info.color_attachment_count, 1);
        assert!(!info.p_depth_attachment.is_null());
        assert_eq!(info.layer_count, 1);
        assert_eq!(bundle.render_area().extent, EXTENT);
    }

    #[test]
    fn bundle_without_depth_leaves_pointer_null() {
        let config = RenderingConfig::new(EXTENT, ColorAttachment::new(vk::ImageView::null()));
        let bundle = config.build();
        assert!(bundle.info().p_depth_attachment.is_null());
    }

    #[test]
    fn bundle_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RenderingInfoBundle>();
        assert_send_sync::<RenderingConfig>();
    }
}
