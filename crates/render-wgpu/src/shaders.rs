//! WGSL sources. Shared declarations are prepended at module creation so
//! every shader sees the same struct layouts as `lumen_render::constants`.

/// Constant layouts and helpers used by every shader.
pub const COMMON: &str = r#"
const PI: f32 = 3.14159265359;

const FLAG_INDIRECT: u32 = 1u;
const FLAG_SSAO: u32 = 2u;
const FLAG_SSAO_ONLY: u32 = 4u;

const LIGHT_DIRECTIONAL: u32 = 0u;
const LIGHT_POINT: u32 = 1u;
const LIGHT_SPOT: u32 = 2u;

struct Light {
    direction: vec3<f32>,
    range: f32,
    position: vec3<f32>,
    intensity: f32,
    color: vec3<f32>,
    spot_falloff: f32,
    kind: u32,
    pad0: u32,
    pad1: u32,
    pad2: u32,
};

struct Frame {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    inv_projection: mat4x4<f32>,
    sky_view_projection: mat4x4<f32>,
    camera_position: vec3<f32>,
    light_count: u32,
    screen_size: vec2<f32>,
    specular_mip_count: f32,
    flags: u32,
    lights: array<Light, 128>,
};

struct Object {
    world: mat4x4<f32>,
    world_inverse_transpose: mat4x4<f32>,
    color_tint: vec4<f32>,
    uv_scale: vec2<f32>,
    uv_offset: vec2<f32>,
};
"#;

/// Oversized triangle covering the viewport. `uv` is (0,0) at the top left.
pub const FULLSCREEN: &str = r#"
struct FullscreenOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOut {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: FullscreenOut;
    out.position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}
"#;

/// Opaque geometry (PBR and Blinn-Phong), light gizmos and the sky.
pub const FORWARD: &str = r#"
@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var irradiance_map: texture_cube<f32>;
@group(0) @binding(2) var specular_map: texture_cube<f32>;
@group(0) @binding(3) var brdf_lut: texture_2d<f32>;
@group(0) @binding(4) var environment_map: texture_cube<f32>;
@group(0) @binding(5) var ibl_sampler: sampler;

@group(1) @binding(0) var<uniform> object: Object;

@group(2) @binding(0) var albedo_map: texture_2d<f32>;
@group(2) @binding(1) var normal_map: texture_2d<f32>;
@group(2) @binding(2) var roughness_map: texture_2d<f32>;
@group(2) @binding(3) var metal_map: texture_2d<f32>;
@group(2) @binding(4) var material_sampler: sampler;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) normal: vec3<f32>,
    @location(3) tangent: vec3<f32>,
};

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) normal: vec3<f32>,
    @location(3) tangent: vec3<f32>,
    @location(4) view_depth: f32,
};

struct SceneOut {
    @location(0) color: vec4<f32>,
    @location(1) ambient: vec4<f32>,
    @location(2) normal: vec4<f32>,
    @location(3) depth: f32,
};

@vertex
fn vs_main(in: VertexIn) -> VertexOut {
    let world = object.world * vec4<f32>(in.position, 1.0);
    let view_position = frame.view * world;
    var out: VertexOut;
    out.clip = frame.projection * view_position;
    out.world_position = world.xyz;
    out.uv = in.uv * object.uv_scale + object.uv_offset;
    out.normal = normalize((object.world_inverse_transpose * vec4<f32>(in.normal, 0.0)).xyz);
    out.tangent = (object.world * vec4<f32>(in.tangent, 0.0)).xyz;
    out.view_depth = -view_position.z;
    return out;
}

fn surface_normal(normal: vec3<f32>, tangent: vec3<f32>, uv: vec2<f32>) -> vec3<f32> {
    let n = normalize(normal);
    let t = normalize(tangent - n * dot(tangent, n));
    let b = cross(n, t);
    let sampled = textureSample(normal_map, material_sampler, uv).xyz * 2.0 - 1.0;
    return normalize(mat3x3<f32>(t, b, n) * sampled);
}

struct LightSample {
    direction: vec3<f32>,
    radiance: vec3<f32>,
};

fn sample_light(light: Light, p: vec3<f32>) -> LightSample {
    var s: LightSample;
    if (light.kind == LIGHT_DIRECTIONAL) {
        s.direction = -light.direction;
        s.radiance = light.color * light.intensity;
        return s;
    }
    let to_light = light.position - p;
    let d2 = dot(to_light, to_light);
    s.direction = to_light * inverseSqrt(max(d2, 1e-8));
    let falloff = saturate(1.0 - d2 / max(light.range * light.range, 1e-8));
    var attenuation = falloff * falloff;
    if (light.kind == LIGHT_SPOT) {
        attenuation *= pow(saturate(dot(-s.direction, light.direction)), light.spot_falloff);
    }
    s.radiance = light.color * light.intensity * attenuation;
    return s;
}

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn geometry_schlick_direct(n_dot_x: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = r * r / 8.0;
    return n_dot_x / (n_dot_x * (1.0 - k) + k);
}

fn fresnel_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (1.0 - f0) * pow(saturate(1.0 - cos_theta), 5.0);
}

fn fresnel_schlick_roughness(cos_theta: f32, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    return f0 + (max(vec3<f32>(1.0 - roughness), f0) - f0) * pow(saturate(1.0 - cos_theta), 5.0);
}

fn indirect_weight() -> f32 {
    return select(0.0, 1.0, (frame.flags & FLAG_INDIRECT) != 0u);
}

fn scene_out(view_depth: f32, n: vec3<f32>, direct: vec3<f32>, ambient: vec3<f32>) -> SceneOut {
    var out: SceneOut;
    out.color = vec4<f32>(direct, 1.0);
    out.ambient = vec4<f32>(ambient, 1.0);
    out.normal = vec4<f32>(normalize((frame.view * vec4<f32>(n, 0.0)).xyz), 0.0);
    out.depth = view_depth;
    return out;
}

@fragment
fn fs_pbr(in: VertexOut) -> SceneOut {
    let albedo = textureSample(albedo_map, material_sampler, in.uv).rgb * object.color_tint.rgb;
    let roughness = clamp(textureSample(roughness_map, material_sampler, in.uv).r, 0.04, 1.0);
    let metal = textureSample(metal_map, material_sampler, in.uv).r;
    let n = surface_normal(in.normal, in.tangent, in.uv);
    let v = normalize(frame.camera_position - in.world_position);
    let n_dot_v = max(dot(n, v), 1e-4);
    let f0 = mix(vec3<f32>(0.04), albedo, metal);

    let irradiance = textureSample(irradiance_map, ibl_sampler, n).rgb;
    let prefiltered = textureSampleLevel(
        specular_map,
        ibl_sampler,
        reflect(-v, n),
        roughness * max(frame.specular_mip_count - 1.0, 0.0),
    ).rgb;
    let brdf = textureSample(brdf_lut, ibl_sampler, vec2<f32>(n_dot_v, roughness)).rg;

    var direct = vec3<f32>(0.0);
    for (var i = 0u; i < frame.light_count; i = i + 1u) {
        let light = sample_light(frame.lights[i], in.world_position);
        let n_dot_l = max(dot(n, light.direction), 0.0);
        if (n_dot_l > 0.0) {
            let h = normalize(v + light.direction);
            let f = fresnel_schlick(max(dot(h, v), 0.0), f0);
            let d = distribution_ggx(max(dot(n, h), 0.0), roughness);
            let g = geometry_schlick_direct(n_dot_v, roughness) * geometry_schlick_direct(n_dot_l, roughness);
            let specular = d * g * f / (4.0 * n_dot_v * n_dot_l + 1e-4);
            let kd = (vec3<f32>(1.0) - f) * (1.0 - metal);
            direct += (kd * albedo / PI + specular) * light.radiance * n_dot_l;
        }
    }

    let f = fresnel_schlick_roughness(n_dot_v, f0, roughness);
    let kd = (vec3<f32>(1.0) - f) * (1.0 - metal);
    let ambient = (kd * irradiance * albedo + prefiltered * (f * brdf.x + brdf.y)) * indirect_weight();

    return scene_out(in.view_depth, n, direct, ambient);
}

@fragment
fn fs_basic(in: VertexOut) -> SceneOut {
    let albedo = textureSample(albedo_map, material_sampler, in.uv).rgb * object.color_tint.rgb;
    let roughness = textureSample(roughness_map, material_sampler, in.uv).r;
    let n = surface_normal(in.normal, in.tangent, in.uv);
    let irradiance = textureSample(irradiance_map, ibl_sampler, n).rgb;
    let v = normalize(frame.camera_position - in.world_position);
    let gloss = 1.0 - roughness;
    let shininess = exp2(gloss * 10.0 + 1.0);

    var direct = vec3<f32>(0.0);
    for (var i = 0u; i < frame.light_count; i = i + 1u) {
        let light = sample_light(frame.lights[i], in.world_position);
        let n_dot_l = max(dot(n, light.direction), 0.0);
        if (n_dot_l > 0.0) {
            let h = normalize(v + light.direction);
            let specular = pow(max(dot(n, h), 0.0), shininess) * gloss;
            direct += (albedo * n_dot_l + vec3<f32>(specular)) * light.radiance;
        }
    }

    let ambient = irradiance * albedo * indirect_weight();
    return scene_out(in.view_depth, n, direct, ambient);
}

@vertex
fn vs_gizmo(in: VertexIn) -> @builtin(position) vec4<f32> {
    return frame.projection * frame.view * object.world * vec4<f32>(in.position, 1.0);
}

@fragment
fn fs_gizmo() -> @location(0) vec4<f32> {
    return vec4<f32>(object.color_tint.rgb, 1.0);
}

struct SkyOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(in: VertexIn) -> SkyOut {
    let clip = frame.sky_view_projection * vec4<f32>(in.position, 1.0);
    var out: SkyOut;
    out.clip = clip.xyww;
    out.direction = in.position;
    return out;
}

@fragment
fn fs_sky(in: SkyOut) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(environment_map, ibl_sampler, normalize(in.direction)).rgb, 1.0);
}
"#;

/// Hemisphere occlusion from linear depth and view-space normals.
pub const SSAO: &str = r#"
struct Ssao {
    kernel: array<vec4<f32>, 64>,
    noise_scale: vec2<f32>,
    radius: f32,
    sample_count: u32,
    bias: f32,
    intensity: f32,
    pad0: f32,
    pad1: f32,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var<uniform> ssao: Ssao;
@group(0) @binding(2) var normal_map: texture_2d<f32>;
@group(0) @binding(3) var depth_map: texture_2d<f32>;
@group(0) @binding(4) var noise_map: texture_2d<f32>;

fn to_uv(ndc: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
}

fn view_position(uv: vec2<f32>, depth: f32) -> vec3<f32> {
    let ndc = vec2<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
    let ray = frame.inv_projection * vec4<f32>(ndc, 1.0, 1.0);
    let dir = ray.xyz / ray.w;
    return dir * (depth / -dir.z);
}

@fragment
fn fs_ssao(in: FullscreenOut) -> @location(0) vec4<f32> {
    let size = vec2<i32>(textureDimensions(depth_map));
    let coord = vec2<i32>(in.position.xy);
    let depth = textureLoad(depth_map, coord, 0).r;
    if (depth <= 0.0) {
        return vec4<f32>(1.0);
    }

    let p = view_position(in.uv, depth);
    let n = normalize(textureLoad(normal_map, coord, 0).xyz);
    let noise_coord = vec2<i32>(fract(in.uv * ssao.noise_scale) * 4.0);
    let random = textureLoad(noise_map, noise_coord, 0).xyz * 2.0 - 1.0;
    let t = normalize(random - n * dot(random, n));
    let b = cross(n, t);
    let tbn = mat3x3<f32>(t, b, n);

    var occlusion = 0.0;
    for (var i = 0u; i < ssao.sample_count; i = i + 1u) {
        let sample_position = p + tbn * ssao.kernel[i].xyz * ssao.radius;
        let clip = frame.projection * vec4<f32>(sample_position, 1.0);
        let uv = to_uv(clip.xy / clip.w);
        if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0))) {
            continue;
        }
        let sample_coord = clamp(vec2<i32>(uv * vec2<f32>(size)), vec2<i32>(0), size - 1);
        let scene_depth = textureLoad(depth_map, sample_coord, 0).r;
        if (scene_depth <= 0.0) {
            continue;
        }
        let range_check = smoothstep(0.0, 1.0, ssao.radius / max(abs(depth - scene_depth), 1e-4));
        if (scene_depth <= -sample_position.z - ssao.bias) {
            occlusion += range_check;
        }
    }

    let ao = pow(saturate(1.0 - occlusion / f32(max(ssao.sample_count, 1u))), ssao.intensity);
    return vec4<f32>(ao, ao, ao, 1.0);
}
"#;

/// 4x4 box blur matching the rotation-noise tile.
pub const SSAO_BLUR: &str = r#"
@group(0) @binding(0) var ssao_raw: texture_2d<f32>;

@fragment
fn fs_blur(in: FullscreenOut) -> @location(0) vec4<f32> {
    let size = vec2<i32>(textureDimensions(ssao_raw));
    let coord = vec2<i32>(in.position.xy);
    var sum = 0.0;
    for (var y = -2; y < 2; y = y + 1) {
        for (var x = -2; x < 2; x = x + 1) {
            let c = clamp(coord + vec2<i32>(x, y), vec2<i32>(0), size - 1);
            sum += textureLoad(ssao_raw, c, 0).r;
        }
    }
    let ao = sum / 16.0;
    return vec4<f32>(ao, ao, ao, 1.0);
}
"#;

/// Final image: direct light plus occluded ambient, or the occlusion alone.
pub const COMPOSITE: &str = r#"
@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var scene_color: texture_2d<f32>;
@group(0) @binding(2) var scene_ambient: texture_2d<f32>;
@group(0) @binding(3) var ao_map: texture_2d<f32>;

@fragment
fn fs_composite(in: FullscreenOut) -> @location(0) vec4<f32> {
    let coord = vec2<i32>(in.position.xy);
    let ao_size = vec2<i32>(textureDimensions(ao_map));
    var ao = 1.0;
    if ((frame.flags & FLAG_SSAO) != 0u) {
        ao = textureLoad(ao_map, min(coord, ao_size - 1), 0).r;
    }
    if ((frame.flags & FLAG_SSAO_ONLY) != 0u) {
        return vec4<f32>(vec3<f32>(ao), 1.0);
    }
    let color = textureLoad(scene_color, coord, 0).rgb;
    let ambient = textureLoad(scene_ambient, coord, 0).rgb;
    return vec4<f32>(color + ambient * ao, 1.0);
}
"#;

/// Bake inputs and sampling helpers shared by the IBL shaders.
pub const IBL_COMMON: &str = r#"
struct Ibl {
    face: u32,
    roughness: f32,
    sample_count: u32,
    source_face_size: f32,
    sample_delta: f32,
    pad0: f32,
    pad1: f32,
    pad2: f32,
};

@group(0) @binding(0) var<uniform> ibl: Ibl;
@group(0) @binding(1) var environment_map: texture_cube<f32>;
@group(0) @binding(2) var environment_sampler: sampler;

fn cube_direction(face: u32, uv: vec2<f32>) -> vec3<f32> {
    let s = uv.x * 2.0 - 1.0;
    let t = uv.y * 2.0 - 1.0;
    var d: vec3<f32>;
    switch face {
        case 0u: { d = vec3<f32>(1.0, -t, -s); }
        case 1u: { d = vec3<f32>(-1.0, -t, s); }
        case 2u: { d = vec3<f32>(s, 1.0, t); }
        case 3u: { d = vec3<f32>(s, -1.0, -t); }
        case 4u: { d = vec3<f32>(s, -t, 1.0); }
        default: { d = vec3<f32>(-s, -t, -1.0); }
    }
    return normalize(d);
}

fn radical_inverse_vdc(bits: u32) -> f32 {
    return f32(reverseBits(bits)) * 2.3283064365386963e-10;
}

fn hammersley(i: u32, n: u32) -> vec2<f32> {
    return vec2<f32>(f32(i) / f32(n), radical_inverse_vdc(i));
}

fn importance_sample_ggx(xi: vec2<f32>, n: vec3<f32>, roughness: f32) -> vec3<f32> {
    let a = roughness * roughness;
    let phi = 2.0 * PI * xi.x;
    let cos_theta = sqrt((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y));
    let sin_theta = sqrt(max(1.0 - cos_theta * cos_theta, 0.0));
    let h = vec3<f32>(cos(phi) * sin_theta, sin(phi) * sin_theta, cos_theta);
    var up = vec3<f32>(1.0, 0.0, 0.0);
    if (abs(n.z) < 0.999) {
        up = vec3<f32>(0.0, 0.0, 1.0);
    }
    let tangent = normalize(cross(up, n));
    let bitangent = cross(n, tangent);
    return normalize(tangent * h.x + bitangent * h.y + n * h.z);
}
"#;

/// Cosine-weighted hemisphere integral of the environment.
pub const IRRADIANCE: &str = r#"
@fragment
fn fs_irradiance(in: FullscreenOut) -> @location(0) vec4<f32> {
    let n = cube_direction(ibl.face, in.uv);
    var up = vec3<f32>(0.0, 1.0, 0.0);
    if (abs(n.y) > 0.999) {
        up = vec3<f32>(0.0, 0.0, 1.0);
    }
    let right = normalize(cross(up, n));
    up = normalize(cross(n, right));

    var irradiance = vec3<f32>(0.0);
    var count = 0.0;
    for (var phi = 0.0; phi < 2.0 * PI; phi = phi + ibl.sample_delta) {
        for (var theta = 0.0; theta < 0.5 * PI; theta = theta + ibl.sample_delta) {
            let local = vec3<f32>(sin(theta) * cos(phi), sin(theta) * sin(phi), cos(theta));
            let direction = local.x * right + local.y * up + local.z * n;
            irradiance += textureSampleLevel(environment_map, environment_sampler, direction, 0.0).rgb
                * cos(theta) * sin(theta);
            count += 1.0;
        }
    }
    return vec4<f32>(PI * irradiance / max(count, 1.0), 1.0);
}
"#;

/// GGX prefilter for one roughness level, reading a blurrier source mip for
/// low-probability samples.
pub const SPECULAR: &str = r#"
fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

@fragment
fn fs_specular(in: FullscreenOut) -> @location(0) vec4<f32> {
    let n = cube_direction(ibl.face, in.uv);
    if (ibl.roughness <= 0.0) {
        return vec4<f32>(textureSampleLevel(environment_map, environment_sampler, n, 0.0).rgb, 1.0);
    }

    let texel_solid_angle = 4.0 * PI / (6.0 * ibl.source_face_size * ibl.source_face_size);
    var color = vec3<f32>(0.0);
    var weight = 0.0;
    for (var i = 0u; i < ibl.sample_count; i = i + 1u) {
        let h = importance_sample_ggx(hammersley(i, ibl.sample_count), n, ibl.roughness);
        let l = normalize(2.0 * dot(n, h) * h - n);
        let n_dot_l = dot(n, l);
        if (n_dot_l <= 0.0) {
            continue;
        }
        let n_dot_h = max(dot(n, h), 0.0);
        let pdf = distribution_ggx(n_dot_h, ibl.roughness) * 0.25 + 1e-4;
        let sample_solid_angle = 1.0 / (f32(ibl.sample_count) * pdf + 1e-4);
        let lod = max(0.5 * log2(sample_solid_angle / texel_solid_angle), 0.0);
        color += textureSampleLevel(environment_map, environment_sampler, l, lod).rgb * n_dot_l;
        weight += n_dot_l;
    }
    return vec4<f32>(color / max(weight, 1e-4), 1.0);
}
"#;

/// Split-sum BRDF table: x is n.v, y is roughness.
pub const BRDF: &str = r#"
fn geometry_schlick_ibl(n_dot_x: f32, roughness: f32) -> f32 {
    let k = roughness * roughness / 2.0;
    return n_dot_x / (n_dot_x * (1.0 - k) + k);
}

@fragment
fn fs_brdf(in: FullscreenOut) -> @location(0) vec4<f32> {
    let n_dot_v = clamp(in.uv.x, 1e-4, 1.0);
    let roughness = in.uv.y;
    let v = vec3<f32>(sqrt(1.0 - n_dot_v * n_dot_v), 0.0, n_dot_v);
    let n = vec3<f32>(0.0, 0.0, 1.0);

    var scale = 0.0;
    var bias = 0.0;
    for (var i = 0u; i < ibl.sample_count; i = i + 1u) {
        let h = importance_sample_ggx(hammersley(i, ibl.sample_count), n, roughness);
        let l = normalize(2.0 * dot(v, h) * h - v);
        let n_dot_l = max(l.z, 0.0);
        let n_dot_h = max(h.z, 0.0);
        let v_dot_h = max(dot(v, h), 0.0);
        if (n_dot_l > 0.0 && n_dot_h > 0.0) {
            let g = geometry_schlick_ibl(n_dot_v, roughness) * geometry_schlick_ibl(n_dot_l, roughness);
            let g_vis = g * v_dot_h / (n_dot_h * n_dot_v);
            let fc = pow(1.0 - v_dot_h, 5.0);
            scale += (1.0 - fc) * g_vis;
            bias += fc * g_vis;
        }
    }
    let count = f32(max(ibl.sample_count, 1u));
    return vec4<f32>(scale / count, bias / count, 0.0, 1.0);
}
"#;

pub fn forward_source() -> String {
    [COMMON, FORWARD].concat()
}

pub fn ssao_source() -> String {
    [COMMON, FULLSCREEN, SSAO].concat()
}

pub fn ssao_blur_source() -> String {
    [FULLSCREEN, SSAO_BLUR].concat()
}

pub fn composite_source() -> String {
    [COMMON, FULLSCREEN, COMPOSITE].concat()
}

/// Irradiance, specular and BRDF bakes share one module.
pub fn ibl_source() -> String {
    [COMMON, FULLSCREEN, IBL_COMMON, IRRADIANCE, SPECULAR, BRDF].concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_render::{FrameFlags, MAX_SSAO_SAMPLES};
    use lumen_scene::{LightKind, MAX_LIGHTS};

    #[test]
    fn array_sizes_match_rust_constants() {
        assert!(COMMON.contains(&format!("array<Light, {MAX_LIGHTS}>")));
        assert!(SSAO.contains(&format!("array<vec4<f32>, {MAX_SSAO_SAMPLES}>")));
    }

    #[test]
    fn flag_and_kind_values_match() {
        assert!(COMMON.contains(&format!(
            "FLAG_INDIRECT: u32 = {}u",
            FrameFlags::INDIRECT_LIGHTING.bits()
        )));
        assert!(COMMON.contains(&format!("FLAG_SSAO: u32 = {}u", FrameFlags::SSAO_ENABLED.bits())));
        assert!(COMMON.contains(&format!(
            "FLAG_SSAO_ONLY: u32 = {}u",
            FrameFlags::SSAO_ONLY.bits()
        )));
        assert!(COMMON.contains(&format!("LIGHT_SPOT: u32 = {}u", LightKind::Spot as u32)));
    }

    #[test]
    fn modules_carry_their_entry_points() {
        let forward = forward_source();
        for entry in ["vs_main", "fs_pbr", "fs_basic", "vs_gizmo", "fs_gizmo", "vs_sky", "fs_sky"] {
            assert!(forward.contains(&format!("fn {entry}(")), "{entry}");
        }
        let ibl = ibl_source();
        for entry in ["vs_fullscreen", "fs_irradiance", "fs_specular", "fs_brdf"] {
            assert!(ibl.contains(&format!("fn {entry}(")), "{entry}");
        }
        assert!(ssao_source().contains("fn fs_ssao("));
        assert!(ssao_blur_source().contains("fn fs_blur("));
        assert!(composite_source().contains("fn fs_composite("));
    }
}
