//! Main renderer orchestration.
//!
//! [`Renderer`] owns every Vulkan resource and drives the frame loop:
//! wait on the slot's fence, acquire an image, write the per-frame
//! buffers, record and submit, present. Resources wrapped in
//! `ManuallyDrop` are torn down explicitly in `Drop` so destruction
//! order is under our control.

use std::mem::ManuallyDrop;
use std::mem::size_of;
use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info, warn};

use glacier_assets::{MeshData, TextureData};
use glacier_core::DeletionQueue;
use glacier_platform::{Surface, Window};
use glacier_rhi::buffer::{Buffer, BufferUsage};
use glacier_rhi::command::CommandBuffer;
use glacier_rhi::descriptor::{
    self, DescriptorBindingBuilder, DescriptorPool, DescriptorSetLayout,
};
use glacier_rhi::device::Device;
use glacier_rhi::image::Image;
use glacier_rhi::instance::Instance;
use glacier_rhi::physical_device::select_physical_device;
use glacier_rhi::pipeline::{
    CullMode, FrontFace, GraphicsPipelineBuilder, Pipeline, PipelineLayout,
};
use glacier_rhi::rendering::{ColorAttachment, DepthAttachment, RenderingConfig};
use glacier_rhi::sampler::{FilterMode, Sampler};
use glacier_rhi::shader::{Shader, ShaderStage};
use glacier_rhi::swapchain::Swapchain;
use glacier_rhi::sync::{FRAME_TIMEOUT_NS, MAX_FRAMES_IN_FLIGHT};
use glacier_rhi::upload::UploadContext;
use glacier_rhi::vertex::Vertex;
use glacier_rhi::RhiError;
use glacier_scene::Camera;

use crate::assets::{AssetStore, Material, MaterialHandle, MeshHandle};
use crate::error::{RenderError, RenderResult};
use crate::frame::{frame_slot, FrameContext};
use crate::gpu_types::{
    pad_uniform_buffer_size, GpuCameraData, GpuObjectData, GpuSceneData, MAX_OBJECTS,
};
use crate::mesh::Mesh;
use crate::render_object::{material_batches, RenderObject};
use crate::texture::Texture;

const VERTEX_SHADER_PATH: &str = "shaders/spirv/tri_mesh.vert.spv";
const DEFAULT_LIT_FRAG_PATH: &str = "shaders/spirv/default_lit.frag.spv";
const TEXTURED_LIT_FRAG_PATH: &str = "shaders/spirv/textured_lit.frag.spv";

const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.15, 1.0];

/// Main renderer. Owns the Vulkan stack end to end.
pub struct Renderer {
    instance: ManuallyDrop<Instance>,
    device: Arc<Device>,
    surface: ManuallyDrop<Surface>,
    swapchain: ManuallyDrop<Swapchain>,
    depth_image: ManuallyDrop<Image>,

    global_layout: ManuallyDrop<DescriptorSetLayout>,
    object_layout: ManuallyDrop<DescriptorSetLayout>,
    texture_layout: ManuallyDrop<DescriptorSetLayout>,
    descriptor_pool: ManuallyDrop<DescriptorPool>,

    upload: ManuallyDrop<UploadContext>,
    /// One aligned `GpuSceneData` slot per frame in flight.
    scene_buffer: ManuallyDrop<Buffer>,
    scene_slot_stride: u64,
    frames: ManuallyDrop<Vec<FrameContext>>,

    assets: AssetStore,
    render_objects: Vec<RenderObject>,
    camera: Camera,
    deletion_queue: DeletionQueue,

    frame_number: u64,
    framebuffer_resized: bool,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Initializes the full Vulkan stack against `window`.
    pub fn new(window: &Window) -> RenderResult<Self> {
        let width = window.width();
        let height = window.height();

        info!("Initializing renderer ({}x{})", width, height);

        let enable_validation = cfg!(debug_assertions);
        let instance = Instance::new(enable_validation)?;

        let surface = window.create_surface(instance.entry(), instance.handle())?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical_device_info)?;

        let swapchain = Swapchain::new(&instance, device.clone(), surface.handle(), width, height)?;
        let depth_image = Image::new_depth(device.clone(), width, height)?;

        let global_layout = DescriptorSetLayout::new(
            device.clone(),
            &[
                DescriptorBindingBuilder::uniform_buffer(0, vk::ShaderStageFlags::VERTEX),
                DescriptorBindingBuilder::uniform_buffer_dynamic(
                    1,
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                ),
            ],
        )?;
        let object_layout = DescriptorSetLayout::new(
            device.clone(),
            &[DescriptorBindingBuilder::storage_buffer(
                0,
                vk::ShaderStageFlags::VERTEX,
            )],
        )?;
        let texture_layout = DescriptorSetLayout::new(
            device.clone(),
            &[DescriptorBindingBuilder::combined_image_sampler(
                0,
                vk::ShaderStageFlags::FRAGMENT,
            )],
        )?;

        let descriptor_pool = DescriptorPool::new(
            device.clone(),
            10,
            &[
                vk::DescriptorPoolSize::default()
                    .ty(vk::DescriptorType::UNIFORM_BUFFER)
                    .descriptor_count(10),
                vk::DescriptorPoolSize::default()
                    .ty(vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC)
                    .descriptor_count(10),
                vk::DescriptorPoolSize::default()
                    .ty(vk::DescriptorType::STORAGE_BUFFER)
                    .descriptor_count(10),
                vk::DescriptorPoolSize::default()
                    .ty(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .descriptor_count(10),
            ],
        )?;

        let graphics_family = device
            .queue_families()
            .graphics_family
            .ok_or(RhiError::NoSuitableGpu)?;
        let upload = UploadContext::new(device.clone(), graphics_family)?;

        let scene_slot_stride = pad_uniform_buffer_size(
            size_of::<GpuSceneData>() as u64,
            device.min_uniform_buffer_offset_alignment(),
        );
        let scene_buffer = Buffer::new(
            device.clone(),
            BufferUsage::Uniform,
            scene_slot_stride * MAX_FRAMES_IN_FLIGHT as u64,
        )?;

        let mut frames = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            frames.push(FrameContext::new(
                device.clone(),
                graphics_family,
                &descriptor_pool,
                global_layout.handle(),
                object_layout.handle(),
                &scene_buffer,
            )?);
        }

        let mut camera = Camera::default();
        camera.set_aspect(width as f32 / height as f32);

        info!("Renderer initialized");

        Ok(Self {
            instance: ManuallyDrop::new(instance),
            device,
            surface: ManuallyDrop::new(surface),
            swapchain: ManuallyDrop::new(swapchain),
            depth_image: ManuallyDrop::new(depth_image),
            global_layout: ManuallyDrop::new(global_layout),
            object_layout: ManuallyDrop::new(object_layout),
            texture_layout: ManuallyDrop::new(texture_layout),
            descriptor_pool: ManuallyDrop::new(descriptor_pool),
            upload: ManuallyDrop::new(upload),
            scene_buffer: ManuallyDrop::new(scene_buffer),
            scene_slot_stride,
            frames: ManuallyDrop::new(frames),
            assets: AssetStore::new(),
            render_objects: Vec::new(),
            camera,
            deletion_queue: DeletionQueue::new(),
            frame_number: 0,
            framebuffer_resized: false,
            width,
            height,
        })
    }

    // Asset creation -------------------------------------------------------

    /// Uploads raw vertices as a mesh.
    pub fn add_mesh(&mut self, vertices: &[Vertex]) -> RenderResult<MeshHandle> {
        let mesh = Mesh::new(self.device.clone(), &self.upload, vertices)?;
        Ok(self.assets.add_mesh(mesh))
    }

    /// Uploads a loaded mesh asset.
    pub fn add_mesh_from_data(&mut self, data: &MeshData) -> RenderResult<MeshHandle> {
        let mesh = Mesh::from_data(self.device.clone(), &self.upload, data)?;
        Ok(self.assets.add_mesh(mesh))
    }

    /// Creates the untextured lit material.
    pub fn create_default_material(&mut self) -> RenderResult<MaterialHandle> {
        let layout = Arc::new(PipelineLayout::new(
            self.device.clone(),
            &[self.global_layout.handle(), self.object_layout.handle()],
        )?);
        let pipeline = self.build_pipeline(Path::new(DEFAULT_LIT_FRAG_PATH), &layout)?;
        Ok(self
            .assets
            .add_material(Material::new(pipeline, layout, None)))
    }

    /// Uploads `data` as a texture and creates a material sampling it at
    /// set 2 binding 0.
    pub fn create_textured_material(
        &mut self,
        data: &TextureData,
    ) -> RenderResult<MaterialHandle> {
        let texture = Texture::new(self.device.clone(), &self.upload, data)?;
        let sampler = Sampler::new(self.device.clone(), FilterMode::Nearest)?;

        let texture_set = self.descriptor_pool.allocate(&[self.texture_layout.handle()])?[0];
        let image_infos = [descriptor::image_info(
            sampler.handle(),
            texture.image_view(),
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        )];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(texture_set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_infos);
        descriptor::update_descriptor_sets(&self.device, &[write]);

        // The sampler has no owner past this point; the deletion queue
        // drops it at teardown, before the device goes away.
        self.deletion_queue.push(move || drop(sampler));
        self.assets.add_texture(texture);

        let layout = Arc::new(PipelineLayout::new(
            self.device.clone(),
            &[
                self.global_layout.handle(),
                self.object_layout.handle(),
                self.texture_layout.handle(),
            ],
        )?);
        let pipeline = self.build_pipeline(Path::new(TEXTURED_LIT_FRAG_PATH), &layout)?;
        Ok(self
            .assets
            .add_material(Material::new(pipeline, layout, Some(texture_set))))
    }

    fn build_pipeline(
        &self,
        fragment_path: &Path,
        layout: &PipelineLayout,
    ) -> RenderResult<Pipeline> {
        let vertex_shader = Shader::from_spirv_file(
            self.device.clone(),
            Path::new(VERTEX_SHADER_PATH),
            ShaderStage::Vertex,
            "main",
        )?;
        let fragment_shader = Shader::from_spirv_file(
            self.device.clone(),
            fragment_path,
            ShaderStage::Fragment,
            "main",
        )?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .color_attachment_format(self.swapchain.format())
            .depth_attachment_format(self.depth_image.format())
            .cull_mode(CullMode::None)
            .front_face(FrontFace::CounterClockwise)
            .depth_test_enable(true)
            .depth_write_enable(true)
            .build(self.device.clone(), layout)?;

        Ok(pipeline)
    }

    // Scene state ----------------------------------------------------------

    pub fn set_render_objects(&mut self, objects: Vec<RenderObject>) {
        if objects.len() > MAX_OBJECTS {
            warn!(
                "Scene has {} objects; only the first {} are drawn",
                objects.len(),
                MAX_OBJECTS
            );
        }
        self.render_objects = objects;
        self.render_objects.truncate(MAX_OBJECTS);
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.render_objects.len()
    }

    /// Marks the swapchain for recreation before the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.framebuffer_resized = true;
    }

    // Frame loop -----------------------------------------------------------

    /// Renders one frame.
    ///
    /// A fence or acquire timeout is fatal and propagates as
    /// [`RhiError::Timeout`]; an out-of-date swapchain recreates and skips
    /// the frame.
    pub fn render_frame(&mut self) -> RenderResult<()> {
        if self.framebuffer_resized {
            self.recreate_swapchain()?;
            self.framebuffer_resized = false;
        }

        let slot = frame_slot(self.frame_number);

        self.frames[slot]
            .render_fence()
            .wait(FRAME_TIMEOUT_NS, "frame fence")?;

        let acquire_semaphore = self.frames[slot].image_available().handle();
        let (image_index, _suboptimal) = match self
            .swapchain
            .acquire_next_image(acquire_semaphore, FRAME_TIMEOUT_NS)
        {
            Ok(result) => result,
            Err(vk::Result::TIMEOUT) | Err(vk::Result::NOT_READY) => {
                return Err(RhiError::Timeout("swapchain acquire").into());
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date on acquire, recreating");
                self.recreate_swapchain()?;
                return Ok(());
            }
            Err(e) => return Err(RenderError::Rhi(RhiError::VulkanError(e))),
        };

        // Only reset once work is guaranteed to be submitted, or the next
        // wait on this fence would never finish.
        self.frames[slot].render_fence().reset()?;

        self.write_frame_buffers(slot)?;
        self.record_commands(slot, image_index)?;

        let frame = &self.frames[slot];
        let wait_semaphores = [acquire_semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.render_finished().handle()];
        let command_buffers = [frame.command_buffer().handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .submit_graphics(&[submit_info], frame.render_fence().handle())?;
        }

        let present_result = self.swapchain.present(
            self.device.present_queue(),
            image_index,
            frame.render_finished().handle(),
        );

        self.frame_number += 1;

        let should_recreate = match present_result {
            Ok(suboptimal) => suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) | Err(vk::Result::SUBOPTIMAL_KHR) => true,
            Err(e) => return Err(RenderError::Rhi(RhiError::VulkanError(e))),
        };
        if should_recreate {
            debug!("Swapchain stale after present, recreating");
            self.recreate_swapchain()?;
        }

        Ok(())
    }

    /// Writes the camera UBO, the scene slot, and every object transform
    /// for this frame.
    fn write_frame_buffers(&self, slot: usize) -> RenderResult<()> {
        let frame = &self.frames[slot];

        let camera_data = GpuCameraData {
            view: self.camera.view_matrix(),
            proj: self.camera.projection_matrix(),
            view_proj: self.camera.view_projection_matrix(),
        };
        frame
            .camera_buffer()
            .write_data(0, bytemuck::bytes_of(&camera_data))?;

        let scene_data = self.scene_data();
        self.scene_buffer.write_data(
            slot as u64 * self.scene_slot_stride,
            bytemuck::bytes_of(&scene_data),
        )?;

        let transforms: Vec<GpuObjectData> = self
            .render_objects
            .iter()
            .map(|obj| GpuObjectData {
                model: obj.transform,
            })
            .collect();
        if !transforms.is_empty() {
            frame
                .object_buffer()
                .write_data(0, bytemuck::cast_slice(&transforms))?;
        }

        Ok(())
    }

    /// Scene parameters for the current frame. The ambient term pulses
    /// slowly with the frame number so shading visibly ticks.
    fn scene_data(&self) -> GpuSceneData {
        let t = self.frame_number as f32 / 120.0;
        GpuSceneData {
            fog_color: glam::Vec4::new(t.sin() * 0.5 + 0.5, 0.0, t.cos() * 0.5 + 0.5, 1.0),
            fog_distances: glam::Vec4::new(self.camera.near, self.camera.far, 0.0, 0.0),
            ambient_color: glam::Vec4::new(t.sin().abs(), 0.0, t.cos().abs(), 1.0),
            sunlight_direction: glam::Vec4::new(0.3, 1.0, 0.3, 1.0),
            sunlight_color: glam::Vec4::ONE,
        }
    }

    fn record_commands(&self, slot: usize, image_index: u32) -> RenderResult<()> {
        let frame = &self.frames[slot];
        let cmd = frame.command_buffer();

        cmd.reset()?;
        cmd.begin()?;

        let color_image = self.swapchain.image(image_index as usize);
        transition_image(
            cmd,
            color_image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageAspectFlags::COLOR,
        );
        transition_image(
            cmd,
            self.depth_image.handle(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
            vk::ImageAspectFlags::DEPTH,
        );

        let color_attachment =
            ColorAttachment::new(self.swapchain.image_view(image_index as usize))
                .with_clear_color(CLEAR_COLOR);
        let depth_attachment =
            DepthAttachment::new(self.depth_image.image_view()).with_clear_depth(1.0);
        let config = RenderingConfig::new(self.swapchain.extent(), color_attachment)
            .with_depth_attachment(depth_attachment);
        let bundle = config.build();

        cmd.begin_rendering(&bundle.info());

        let extent = self.swapchain.extent();
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        cmd.set_viewport(&viewport);
        cmd.set_scissor(&bundle.render_area());

        self.draw_objects(slot, cmd);

        cmd.end_rendering();

        transition_image(
            cmd,
            color_image,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
            vk::ImageAspectFlags::COLOR,
        );

        cmd.end()?;
        Ok(())
    }

    /// Records draws for every render object, rebinding pipeline state
    /// once per run of consecutive objects sharing a material.
    fn draw_objects(&self, slot: usize, cmd: &CommandBuffer) {
        let frame = &self.frames[slot];
        let scene_offset = (slot as u64 * self.scene_slot_stride) as u32;

        for (material_handle, range) in material_batches(&self.render_objects) {
            let Some(material) = self.assets.material(material_handle) else {
                warn!("Skipping batch with unknown material {:?}", material_handle);
                continue;
            };

            cmd.bind_pipeline(vk::PipelineBindPoint::GRAPHICS, material.pipeline());
            cmd.bind_descriptor_sets(
                vk::PipelineBindPoint::GRAPHICS,
                material.pipeline_layout(),
                0,
                &[frame.global_set(), frame.object_set()],
                &[scene_offset],
            );
            if let Some(texture_set) = material.texture_set() {
                cmd.bind_descriptor_sets(
                    vk::PipelineBindPoint::GRAPHICS,
                    material.pipeline_layout(),
                    2,
                    &[texture_set],
                    &[],
                );
            }

            for index in range {
                let object = &self.render_objects[index];
                let Some(mesh) = self.assets.mesh(object.mesh) else {
                    warn!("Skipping object with unknown mesh {:?}", object.mesh);
                    continue;
                };
                cmd.bind_vertex_buffers(0, &[mesh.vertex_buffer()], &[0]);
                // first_instance carries the object index; the vertex shader
                // reads its transform from the storage buffer with it.
                cmd.draw(mesh.vertex_count(), 1, 0, index as u32);
            }
        }
    }

    fn recreate_swapchain(&mut self) -> RenderResult<()> {
        self.swapchain.recreate(
            &self.instance,
            self.surface.handle(),
            self.width,
            self.height,
        )?;

        let new_depth = Image::new_depth(self.device.clone(), self.width, self.height)?;
        unsafe {
            ManuallyDrop::drop(&mut self.depth_image);
        }
        self.depth_image = ManuallyDrop::new(new_depth);

        self.camera
            .set_aspect(self.width as f32 / self.height as f32);

        Ok(())
    }
}

/// Records a full-subresource image layout transition with conservative
/// stage masks.
fn transition_image(
    cmd: &CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    aspect: vk::ImageAspectFlags,
) {
    let (src_stage, src_access) = match old_layout {
        vk::ImageLayout::UNDEFINED => (
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::AccessFlags::empty(),
        ),
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => (
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        ),
        _ => (
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::AccessFlags::MEMORY_WRITE,
        ),
    };
    let (dst_stage, dst_access) = match new_layout {
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => (
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        ),
        vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL => (
            vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
                | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
        vk::ImageLayout::PRESENT_SRC_KHR => (
            vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            vk::AccessFlags::empty(),
        ),
        _ => (
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
        ),
    };

    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_access_mask(src_access)
        .dst_access_mask(dst_access)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(
            vk::ImageSubresourceRange::default()
                .aspect_mask(aspect)
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1),
        );

    cmd.pipeline_barrier(src_stage, dst_stage, &[barrier]);
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle during teardown: {:?}", e);
        }

        self.deletion_queue.flush();
        self.assets.clear();

        unsafe {
            ManuallyDrop::drop(&mut self.frames);
            ManuallyDrop::drop(&mut self.scene_buffer);
            ManuallyDrop::drop(&mut self.upload);
            ManuallyDrop::drop(&mut self.descriptor_pool);
            ManuallyDrop::drop(&mut self.texture_layout);
            ManuallyDrop::drop(&mut self.object_layout);
            ManuallyDrop::drop(&mut self.global_layout);
            ManuallyDrop::drop(&mut self.depth_image);
            ManuallyDrop::drop(&mut self.swapchain);
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.instance);
        }

        info!("Renderer destroyed");
    }
}
