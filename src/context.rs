//! The render device context.
//!
//! A [`RenderContext`] owns every registry (buffers, shaders, textures), the active render
//! states, the draw list and the default framebuffer, and exposes the engine's procedural API as
//! methods. There is no global mutable state: "current" contexts are tracked per thread through
//! a thread-local id slot, and at most one context may be current on a thread at a time.
//!
//! Recoverable misuse sets the context's last-error flag and returns a benign value; see the
//! [`error`][crate::error] module.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arrayvec::ArrayVec;
use glimmer_math::{DepthValue, Vec4};

use crate::assembly::assemble_primitives;
use crate::buffers::{AttributeBuffer, IndexBuffer, VertexBuffer};
use crate::clip::{clip_line_buffer, clip_triangle_buffer, ClipOutput};
use crate::error::{ContextError, ErrorKind};
use crate::framebuffer::DefaultFramebuffer;
use crate::geom::limits::{MAX_ATTRIBUTES, MAX_TEXTURE_UNITS, MAX_UNIFORM_LOCATIONS};
use crate::geom::{Vertex, VertexFlags};
use crate::pipeline::{invoke_vertex_shader_and_clip_preprocess, transform_to_viewport};
use crate::pixel::PixelFormat;
use crate::raster::SweepRasterizer;
use crate::render_object::RenderObject;
use crate::shader::{DefaultProgram, Program, ProgramInfo, Uniform};
use crate::slot_map::SlotMap;
use crate::states::{
    BlendFactor, ComparisonFunc, CullFaceDirection, FrontFaceOrientation, PolygonMode,
    PrimitiveMode, Rect, RenderStates, StateFlag, StateSnapshot,
};
use crate::texture::{Texture2d, TextureFilter, TextureTarget, WrapMode};

/// Host-provided presentation surface, named only by interface: the engine pushes rows of packed
/// pixels, the host owns windowing and display.
pub trait HostSurface {
    /// Surface dimensions as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Receives one row of packed pixels in the context's pixel format.
    fn write_row(&mut self, y: u32, row: &[u32]);
}

/// Source of unique context ids.
static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Id of the context current on this thread, if any.
    static CURRENT_CONTEXT: Cell<Option<u64>> = const { Cell::new(None) };
}

/// A software rendering context.
pub struct RenderContext {
    id: u64,

    /// Context dimensions as requested by the host; the framebuffer may be slightly larger due
    /// to block alignment.
    width: i32,
    height: i32,

    /// Clear color, stored packed in the buffer's pixel format.
    clear_color: u32,

    /// Clear value for the depth buffer.
    clear_depth: DepthValue,

    /// The default framebuffer.
    framebuffer: DefaultFramebuffer,

    /// The current render states, copied on each draw call.
    states: RenderStates,

    /// Last detected recoverable error.
    last_error: ErrorKind,

    /// Draw list, filled by draw calls and consumed by present.
    draw_list: Vec<RenderObject>,

    /// Buffer registries.
    vertex_buffers: SlotMap<VertexBuffer>,
    index_buffers: SlotMap<IndexBuffer>,
    attribute_buffers: SlotMap<AttributeBuffer>,

    /// Attribute buffer bound to each slot.
    active_attributes: [Option<u32>; MAX_ATTRIBUTES],

    /// Registered shaders. Slot 0 holds the built-in no-op program.
    shaders: SlotMap<Arc<ProgramInfo>>,

    /// Texture registry. Slot 0 holds the built-in checkerboard.
    textures: SlotMap<Arc<Texture2d>>,

    /// Active texture unit for filter operations.
    active_texture_unit: usize,

    /// The rasterizer.
    rasterizer: SweepRasterizer,
}

impl RenderContext {
    /// Creates a context rendering into its own `width` × `height` framebuffer with the given
    /// pixel format. `thread_hint` sizes the rasterizer worker pool; `0` selects
    /// single-threaded operation.
    pub fn new(
        width: i32,
        height: i32,
        format: PixelFormat,
        thread_hint: usize,
    ) -> Result<RenderContext, ContextError> {
        if width <= 0 || height <= 0 {
            return Err(ContextError::InvalidDimensions { width, height });
        }

        let framebuffer = DefaultFramebuffer::new(width, height, format);
        let rasterizer = SweepRasterizer::new(thread_hint, framebuffer.width(), framebuffer.height());

        let mut context = RenderContext {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            clear_color: 0,
            clear_depth: DepthValue::FAR,
            framebuffer,
            states: RenderStates::new(width as u32, height as u32),
            last_error: ErrorKind::None,
            draw_list: Vec::new(),
            vertex_buffers: SlotMap::new(),
            index_buffers: SlotMap::new(),
            attribute_buffers: SlotMap::new(),
            active_attributes: [None; MAX_ATTRIBUTES],
            shaders: SlotMap::new(),
            textures: SlotMap::new(),
            active_texture_unit: 0,
            rasterizer,
        };

        // The built-in no-op program occupies shader slot 0.
        let default_program = context
            .shaders
            .push(Arc::new(ProgramInfo::new(Box::new(DefaultProgram))));
        debug_assert_eq!(default_program, 0);

        // The built-in 2×2 checkerboard occupies texture slot 0.
        let mut checkerboard = Texture2d::new();
        let texels: [u8; 16] = [
            0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0xff, //
            0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff,
        ];
        checkerboard
            .set_data(0, 2, 2, PixelFormat::Rgba8888, &texels)
            .expect("default texture upload cannot fail");
        let default_texture = context.textures.push(Arc::new(checkerboard));
        debug_assert_eq!(default_texture, 0);

        // Start from a cleared depth buffer.
        context.framebuffer.depth.clear(DepthValue::FAR);

        log::debug!(
            "created context {} ({}x{}, {:?}, {} worker threads)",
            context.id,
            width,
            height,
            format,
            thread_hint
        );

        Ok(context)
    }

    fn set_error(&mut self, error: ErrorKind) {
        self.last_error = error;
    }

    /// Returns the last recorded error and clears the flag.
    pub fn get_last_error(&mut self) -> ErrorKind {
        std::mem::take(&mut self.last_error)
    }

    /// Context width as requested by the host.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Context height as requested by the host.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The default framebuffer, for read-back.
    pub fn framebuffer(&self) -> &DefaultFramebuffer {
        &self.framebuffer
    }

    /// Fragment statistics of the last present cycle as
    /// `(processed, scissor-discards, shader-discards, depth-discards)`.
    pub fn fragment_stats(&self) -> (u64, u64, u64, u64) {
        self.rasterizer.stats.snapshot()
    }

    /*
     * Current-context tracking.
     */

    /// Makes this context the current one on the calling thread.
    ///
    /// Fails with [`ErrorKind::InvalidOperation`] when a different context is already current on
    /// this thread.
    pub fn make_current(&mut self) -> bool {
        CURRENT_CONTEXT.with(|current| match current.get() {
            None => {
                current.set(Some(self.id));
                true
            }
            Some(id) if id == self.id => true,
            Some(_) => {
                self.set_error(ErrorKind::InvalidOperation);
                false
            }
        })
    }

    /// Releases this context from the calling thread, if it is current.
    pub fn release_current(&mut self) {
        CURRENT_CONTEXT.with(|current| {
            if current.get() == Some(self.id) {
                current.set(None);
            }
        });
    }

    /// Returns `true` if this context is current on the calling thread.
    pub fn is_current(&self) -> bool {
        CURRENT_CONTEXT.with(|current| current.get() == Some(self.id))
    }

    /*
     * Buffer management.
     */

    /// Creates a vertex buffer and returns its id.
    pub fn create_vertex_buffer(&mut self, data: Vec<Vec4>) -> u32 {
        self.vertex_buffers.push(VertexBuffer::new(data))
    }

    /// Frees a vertex buffer.
    pub fn delete_vertex_buffer(&mut self, id: u32) {
        if self.vertex_buffers.free(id).is_none() {
            self.set_error(ErrorKind::InvalidValue);
        }
    }

    /// Returns the contents of a vertex buffer.
    pub fn vertex_buffer(&self, id: u32) -> Option<&[Vec4]> {
        self.vertex_buffers.get(id).map(|b| b.data.as_slice())
    }

    /// Creates an index buffer and returns its id.
    pub fn create_index_buffer(&mut self, data: Vec<u32>) -> u32 {
        self.index_buffers.push(IndexBuffer::new(data))
    }

    /// Frees an index buffer.
    pub fn delete_index_buffer(&mut self, id: u32) {
        if self.index_buffers.free(id).is_none() {
            self.set_error(ErrorKind::InvalidValue);
        }
    }

    /// Creates an attribute buffer and returns its id.
    pub fn create_attribute_buffer(&mut self, data: Vec<Vec4>) -> u32 {
        self.attribute_buffers.push(AttributeBuffer::new(data))
    }

    /// Frees an attribute buffer.
    pub fn delete_attribute_buffer(&mut self, id: u32) {
        match self.attribute_buffers.free(id) {
            Some(buffer) => {
                if let Some(slot) = buffer.slot {
                    self.active_attributes[slot as usize] = None;
                }
            }
            None => self.set_error(ErrorKind::InvalidValue),
        }
    }

    /// Binds an attribute buffer to a slot.
    pub fn enable_attribute_buffer(&mut self, id: u32, slot: u32) {
        if slot as usize >= MAX_ATTRIBUTES || !self.attribute_buffers.contains(id) {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }

        // Whatever held the slot before loses it.
        if let Some(previous) = self.active_attributes[slot as usize] {
            if let Some(buffer) = self.attribute_buffers.get_mut(previous) {
                buffer.slot = None;
            }
        }

        self.active_attributes[slot as usize] = Some(id);
        if let Some(buffer) = self.attribute_buffers.get_mut(id) {
            buffer.slot = Some(slot);
        }
    }

    /// Unbinds an attribute buffer from its slot.
    pub fn disable_attribute_buffer(&mut self, id: u32) {
        let Some(buffer) = self.attribute_buffers.get_mut(id) else {
            self.set_error(ErrorKind::InvalidValue);
            return;
        };

        match buffer.slot.take() {
            Some(slot) => self.active_attributes[slot as usize] = None,
            None => self.set_error(ErrorKind::InvalidValue),
        }
    }

    /*
     * Shaders and uniforms.
     */

    /// Registers a shader program and returns its positive id.
    pub fn register_shader(&mut self, program: Box<dyn Program>) -> u32 {
        let id = self.shaders.push(Arc::new(ProgramInfo::new(program)));
        log::debug!("registered shader {id}");
        id
    }

    /// Unregisters a shader. Id 0 is the built-in program and cannot be unregistered.
    pub fn unregister_shader(&mut self, id: u32) {
        if id == 0 {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }
        if self.shaders.free(id).is_none() {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }
        if self.states.shader_id == id {
            self.states.shader_id = 0;
        }
    }

    /// Binds a shader. Id 0 selects the built-in no-op program.
    pub fn bind_shader(&mut self, id: u32) -> bool {
        if self.shaders.contains(id) {
            self.states.shader_id = id;
            true
        } else {
            self.set_error(ErrorKind::InvalidValue);
            false
        }
    }

    /// Writes a uniform at `location`. Locations grow on write up to
    /// [`MAX_UNIFORM_LOCATIONS`]; unset locations read as zero.
    pub fn bind_uniform(&mut self, location: u32, value: impl Into<Uniform>) {
        let location = location as usize;
        if location >= MAX_UNIFORM_LOCATIONS {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }

        if location >= self.states.uniforms.len() {
            self.states.uniforms.resize(location + 1, Uniform::default());
        }
        self.states.uniforms[location] = value.into();
    }

    /*
     * Texture management.
     */

    /// Allocates a texture and returns its positive id.
    pub fn create_texture(&mut self) -> u32 {
        self.textures.push(Arc::new(Texture2d::new()))
    }

    /// Frees a texture. Any unit it was bound to falls back to the built-in checkerboard.
    pub fn release_texture(&mut self, id: u32) {
        if id == 0 {
            // Destroying the default texture is not allowed.
            self.set_error(ErrorKind::InvalidOperation);
            return;
        }

        if self.textures.free(id).is_none() {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }

        for bound in &mut self.states.bound_textures {
            if *bound == id {
                *bound = 0;
            }
        }
    }

    /// Selects the active texture unit.
    pub fn active_texture(&mut self, unit: u32) {
        if (unit as usize) < MAX_TEXTURE_UNITS {
            self.active_texture_unit = unit as usize;
        } else {
            self.set_error(ErrorKind::InvalidValue);
        }
    }

    /// Binds a texture to the active unit.
    pub fn bind_texture(&mut self, target: TextureTarget, id: u32) -> bool {
        let TextureTarget::Texture2d = target;

        if self.textures.contains(id) {
            self.states.bound_textures[self.active_texture_unit] = id;
            true
        } else {
            self.set_error(ErrorKind::InvalidValue);
            false
        }
    }

    fn with_texture_mut(&mut self, id: u32, f: impl FnOnce(&mut Texture2d) -> Result<(), ErrorKind>) {
        if id == 0 {
            // The built-in texture's storage is fixed.
            self.set_error(ErrorKind::InvalidOperation);
            return;
        }

        let result = match self.textures.get_mut(id) {
            // Clone-on-write: snapshots taken by in-flight draw calls keep the old texels.
            Some(texture) => f(Arc::make_mut(texture)),
            None => Err(ErrorKind::InvalidValue),
        };

        if let Err(error) = result {
            self.set_error(error);
        }
    }

    /// Allocates texture storage and uploads image data for a level.
    pub fn set_image(
        &mut self,
        texture_id: u32,
        level: u32,
        width: i32,
        height: i32,
        format: PixelFormat,
        data: &[u8],
    ) {
        self.with_texture_mut(texture_id, |t| t.set_data(level, width, height, format, data));
    }

    /// Updates part of a texture level.
    #[allow(clippy::too_many_arguments)]
    pub fn set_sub_image(
        &mut self,
        texture_id: u32,
        level: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: PixelFormat,
        data: &[u8],
    ) {
        self.with_texture_mut(texture_id, |t| {
            t.set_sub_data(level, x, y, width, height, format, data)
        });
    }

    /// Sets a texture's wrapping modes. Sampler state of the built-in texture is adjustable;
    /// only its storage is fixed.
    pub fn set_texture_wrap_mode(&mut self, id: u32, s: WrapMode, t: WrapMode) {
        match self.textures.get_mut(id) {
            Some(texture) => Arc::make_mut(texture).set_wrap(s, t),
            None => self.set_error(ErrorKind::InvalidValue),
        }
    }

    /// Returns a texture's wrapping modes as `(s, t)`.
    pub fn get_texture_wrap_mode(&mut self, id: u32) -> Option<(WrapMode, WrapMode)> {
        match self.textures.get(id) {
            Some(texture) => Some(texture.wrap_modes()),
            None => {
                self.set_error(ErrorKind::InvalidValue);
                None
            }
        }
    }

    fn bound_texture_id(&self) -> u32 {
        self.states.bound_textures[self.active_texture_unit]
    }

    /// Sets the minification filter of the texture bound to the active unit.
    pub fn set_texture_minification_filter(&mut self, filter: TextureFilter) {
        let id = self.bound_texture_id();
        if let Some(texture) = self.textures.get_mut(id) {
            Arc::make_mut(texture).set_filter_min(filter);
        }
    }

    /// Sets the magnification filter of the texture bound to the active unit.
    pub fn set_texture_magnification_filter(&mut self, filter: TextureFilter) {
        let id = self.bound_texture_id();
        if let Some(texture) = self.textures.get_mut(id) {
            Arc::make_mut(texture).set_filter_mag(filter);
        }
    }

    /// Returns the minification filter of the texture bound to the active unit.
    pub fn get_texture_minification_filter(&self) -> TextureFilter {
        self.textures
            .get(self.bound_texture_id())
            .map(|t| t.filters().1)
            .unwrap_or_default()
    }

    /// Returns the magnification filter of the texture bound to the active unit.
    pub fn get_texture_magnification_filter(&self) -> TextureFilter {
        self.textures
            .get(self.bound_texture_id())
            .map(|t| t.filters().0)
            .unwrap_or_default()
    }

    /*
     * States.
     */

    /// Enables or disables a pipeline state.
    pub fn set_state(&mut self, state: StateFlag, enable: bool) {
        match state {
            StateFlag::Blend => self.states.blending_enabled = enable,
            StateFlag::CullFace => self.states.culling_enabled = enable,
            StateFlag::DepthTest => self.states.depth_test_enabled = enable,
            StateFlag::DepthWrite => self.states.write_depth = enable,
            StateFlag::ScissorTest => self.states.scissor_test_enabled = enable,
            StateFlag::Texture => self.states.texturing_enabled = enable,
        }
    }

    /// Returns the value of a pipeline state.
    pub fn get_state(&self, state: StateFlag) -> bool {
        match state {
            StateFlag::Blend => self.states.blending_enabled,
            StateFlag::CullFace => self.states.culling_enabled,
            StateFlag::DepthTest => self.states.depth_test_enabled,
            StateFlag::DepthWrite => self.states.write_depth,
            StateFlag::ScissorTest => self.states.scissor_test_enabled,
            StateFlag::Texture => self.states.texturing_enabled,
        }
    }

    /// Sets the clear color. Components are clamped to `[0, 1]`.
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color = self
            .framebuffer
            .converter
            .to_pixel(Vec4::new(r, g, b, a).clamp01());
    }

    /// Sets the depth clear value, clamped to `[0, 1]`.
    pub fn set_clear_depth(&mut self, z: f32) {
        self.clear_depth = DepthValue::from_f32(z);
    }

    /// Sets the viewport rectangle.
    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width < 0 || height < 0 {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }

        self.states.x = x;
        self.states.y = y;
        self.states.width = width as u32;
        self.states.height = height as u32;
    }

    /// Sets the mapping of depth values from normalized device coordinates to window
    /// coordinates. Both bounds are clamped to `[0, 1]`.
    pub fn set_depth_range(&mut self, z_near: f32, z_far: f32) {
        self.states.z_near = z_near.clamp(0.0, 1.0);
        self.states.z_far = z_far.clamp(0.0, 1.0);
    }

    /// Sets the scissor box in viewport coordinates.
    pub fn set_scissor_box(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width < 0 || height < 0 {
            self.set_error(ErrorKind::InvalidValue);
            return;
        }

        self.states.scissor_box = Rect::new(x, x + width, y, y + height);
    }

    /// Sets the depth comparison function.
    pub fn set_depth_test(&mut self, func: ComparisonFunc) {
        self.states.depth_func = func;
    }

    /// Returns the depth comparison function.
    pub fn get_depth_test(&self) -> ComparisonFunc {
        self.states.depth_func
    }

    /// Defines which winding is front-facing.
    pub fn set_front_face(&mut self, orientation: FrontFaceOrientation) {
        self.states.front_face = orientation;
    }

    /// Returns the front-face winding.
    pub fn get_front_face(&self) -> FrontFaceOrientation {
        self.states.front_face
    }

    /// Selects which faces are culled.
    pub fn set_cull_mode(&mut self, mode: CullFaceDirection) {
        self.states.cull_mode = mode;
    }

    /// Returns the cull mode.
    pub fn get_cull_mode(&self) -> CullFaceDirection {
        self.states.cull_mode
    }

    /// Selects the polygon rasterization mode.
    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.states.poly_mode = mode;
    }

    /// Returns the polygon rasterization mode.
    pub fn get_polygon_mode(&self) -> PolygonMode {
        self.states.poly_mode
    }

    /// Specifies the blend factors.
    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.states.blend_src = src;
        self.states.blend_dst = dst;
    }

    /// Returns the source blend factor.
    pub fn get_source_blend_func(&self) -> BlendFactor {
        self.states.blend_src
    }

    /// Returns the destination blend factor.
    pub fn get_destination_blend_func(&self) -> BlendFactor {
        self.states.blend_dst
    }

    /*
     * Frame operations.
     */

    /// Clears the color buffer to the clear color, respecting an active scissor box.
    pub fn clear_color_buffer(&mut self) {
        match self.scissored_clear_rect() {
            Some(rect) => self.framebuffer.color.clear_rect(rect, self.clear_color),
            None => self.framebuffer.color.clear(self.clear_color),
        }
    }

    /// Clears the depth buffer to the clear depth, respecting an active scissor box.
    pub fn clear_depth_buffer(&mut self) {
        match self.scissored_clear_rect() {
            Some(rect) => self.framebuffer.depth.clear_rect(rect, self.clear_depth),
            None => self.framebuffer.depth.clear(self.clear_depth),
        }
    }

    /// The raster-space rectangle of a scissored clear, or `None` for a full clear.
    fn scissored_clear_rect(&self) -> Option<Rect> {
        if !self.states.scissor_test_enabled {
            return None;
        }

        let (w, h) = (self.framebuffer.width(), self.framebuffer.height());
        let b = self.states.scissor_box;
        if b.x_min == 0 && b.x_max == w && b.y_min == 0 && b.y_max == h {
            return None;
        }

        // Flip the y range into raster coordinates.
        Some(Rect::new(
            b.x_min.clamp(0, w),
            b.x_max.clamp(0, w),
            (h - b.y_max).clamp(0, h),
            (h - b.y_min).clamp(0, h),
        ))
    }

    /*
     * Drawing.
     */

    /// Snapshots the active render states for a draw call.
    fn snapshot_states(&self) -> Arc<StateSnapshot> {
        let program = self
            .shaders
            .get(self.states.shader_id)
            .or_else(|| self.shaders.get(0))
            .cloned()
            .expect("default shader always present");

        let mut textures: ArrayVec<Option<Arc<Texture2d>>, MAX_TEXTURE_UNITS> = ArrayVec::new();
        if self.states.texturing_enabled {
            for &id in &self.states.bound_textures {
                textures.push(self.textures.get(id).or_else(|| self.textures.get(0)).cloned());
            }
        }

        Arc::new(StateSnapshot {
            states: self.states.clone(),
            program,
            textures,
        })
    }

    /// Gathers `count` vertices from the enabled attribute buffers.
    ///
    /// Every enabled buffer must hold at least `count` entries; slots without a buffer up to the
    /// highest enabled one read as zero.
    fn gather_vertices(&mut self, count: usize) -> Option<Vec<Vertex>> {
        let active = self.active_attributes;
        let highest_slot = active
            .iter()
            .rposition(Option::is_some)
            .map(|slot| slot + 1)
            .unwrap_or(0);

        for id in active[..highest_slot].iter().flatten() {
            match self.attribute_buffers.get(*id) {
                Some(buffer) if buffer.data.len() >= count => {}
                _ => {
                    self.set_error(ErrorKind::InvalidValue);
                    return None;
                }
            }
        }

        let mut vertices = vec![Vertex::default(); count];
        for (slot, id) in active[..highest_slot].iter().enumerate() {
            let data = id.and_then(|id| self.attribute_buffers.get(id)).map(|b| &b.data);
            for (i, vertex) in vertices.iter_mut().enumerate() {
                let value = data.map(|d| d[i]).unwrap_or(Vec4::ZERO);
                debug_assert_eq!(vertex.attribs.len(), slot);
                vertex.attribs.push(value);
            }
        }

        Some(vertices)
    }

    fn base_mode_supported(mode: PrimitiveMode) -> bool {
        matches!(
            mode,
            PrimitiveMode::Points | PrimitiveMode::Lines | PrimitiveMode::Triangles
        )
    }

    /// Appends `vertex_count` vertices from the enabled attribute buffers to the draw list.
    pub fn draw_elements(&mut self, vertex_count: usize, mode: PrimitiveMode) {
        if !Self::base_mode_supported(mode) {
            // The higher-order modes exist for the immediate-mode adapter only.
            self.set_error(ErrorKind::InvalidOperation);
            return;
        }

        let Some(vertices) = self.gather_vertices(vertex_count) else {
            return;
        };

        self.draw_list
            .push(RenderObject::new(vertices, mode, self.snapshot_states()));
    }

    /// Appends an indexed subset of the enabled attribute buffers to the draw list.
    pub fn draw_indexed_elements(&mut self, index_buffer_id: u32, mode: PrimitiveMode) {
        if !Self::base_mode_supported(mode) {
            self.set_error(ErrorKind::InvalidOperation);
            return;
        }

        let Some(indices) = self.index_buffers.get(index_buffer_id).map(|b| b.data.clone())
        else {
            self.set_error(ErrorKind::InvalidValue);
            return;
        };

        let vertex_count = indices.iter().max().map(|&i| i as usize + 1).unwrap_or(0);
        if vertex_count == 0 {
            return;
        }

        let Some(vertices) = self.gather_vertices(vertex_count) else {
            return;
        };

        self.draw_list.push(RenderObject::with_indices(
            vertices,
            indices,
            mode,
            self.snapshot_states(),
        ));
    }

    /// Synthesizes the image from the accumulated draw list.
    ///
    /// For each entry this runs the vertex shader, clipping, the viewport transform and
    /// primitive assembly, then flushes the rasterizer. The draw list is empty when the call
    /// returns; buffer handles stay valid.
    pub fn present(&mut self) {
        let mut draw_list = std::mem::take(&mut self.draw_list);

        for object in &mut draw_list {
            if object.vertices.is_empty() || object.indices.is_empty() {
                continue;
            }

            let snapshot = Arc::clone(&object.snapshot);
            let states = &snapshot.states;

            // Vertex shading and clip preprocessing. The whole object may be trivially gone.
            let discard = invoke_vertex_shader_and_clip_preprocess(
                &snapshot.program,
                &states.uniforms,
                &mut object.vertices,
            );
            if discard {
                continue;
            }

            // Clipping pre-assembles the primitives.
            object.clipped.clear();
            if object.mode == PrimitiveMode::Points || states.poly_mode == PolygonMode::Point {
                for &index in &object.indices {
                    if let Some(vertex) = object.vertices.get(index as usize) {
                        if !vertex.flags.contains(VertexFlags::CLIP_DISCARD) {
                            object.clipped.push(vertex.clone());
                        }
                    }
                }
            } else if object.mode == PrimitiveMode::Lines {
                clip_line_buffer(
                    &object.vertices,
                    &object.indices,
                    ClipOutput::LineList,
                    &mut object.clipped,
                );
            } else if states.poly_mode == PolygonMode::Line {
                clip_triangle_buffer(
                    &object.vertices,
                    &object.indices,
                    ClipOutput::LineList,
                    &mut object.clipped,
                );
            } else {
                clip_triangle_buffer(
                    &object.vertices,
                    &object.indices,
                    ClipOutput::TriangleList,
                    &mut object.clipped,
                );
            }

            if object.clipped.is_empty() {
                continue;
            }

            transform_to_viewport(
                &mut object.clipped,
                states.x,
                states.y,
                states.width,
                states.height,
                states.z_near,
                states.z_far,
            );

            assemble_primitives(&mut self.rasterizer, &snapshot, object.mode, &object.clipped);
        }

        // Rasterize everything; this drains the worker queue before returning.
        let target = self.framebuffer.target();
        self.rasterizer.draw_primitives(&target);
    }

    /// Copies the default color buffer out to a host surface, row by row.
    pub fn copy_default_color_buffer(&mut self, surface: &mut dyn HostSurface) {
        let (surface_w, surface_h) = surface.dimensions();
        let copy_w = (surface_w as usize).min(self.width as usize);
        let copy_h = (surface_h as i32).min(self.height);

        let pitch = self.framebuffer.width() as usize;
        let data = self.framebuffer.color.data();

        for y in 0..copy_h {
            let row = &data[y as usize * pitch..y as usize * pitch + copy_w];
            surface.write_row(y as u32, row);
        }
    }

    /// Debug helper: renders the depth attachment into the color buffer as grayscale.
    pub fn display_depth_buffer(&mut self) {
        let w = self.framebuffer.width();
        let h = self.framebuffer.height();

        for y in 0..h {
            for x in 0..w {
                let depth = self.framebuffer.depth.at(x, y).to_f32();
                let pixel = self
                    .framebuffer
                    .converter
                    .to_pixel(Vec4::new(depth, depth, depth, 1.0));
                self.framebuffer.color.set(x, y, pixel);
            }
        }
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.release_current();
    }
}
