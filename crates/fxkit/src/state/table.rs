//! The fixed table of state operations.
//!
//! Legacy bundles address operations by their position in this table, so the order is part of
//! the format and must not change.

use super::StateClass;

/// One entry of [`STATE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub class: StateClass,
    /// Native operation code within `class` (e.g. a `D3DRENDERSTATETYPE` value).
    pub op: u32,
    pub name: &'static str,
}

// D3DRENDERSTATETYPE
pub const D3DRS_ZENABLE: u32 = 7;
pub const D3DRS_FILLMODE: u32 = 8;
pub const D3DRS_SHADEMODE: u32 = 9;
pub const D3DRS_ZWRITEENABLE: u32 = 14;
pub const D3DRS_ALPHATESTENABLE: u32 = 15;
pub const D3DRS_LASTPIXEL: u32 = 16;
pub const D3DRS_SRCBLEND: u32 = 19;
pub const D3DRS_DESTBLEND: u32 = 20;
pub const D3DRS_CULLMODE: u32 = 22;
pub const D3DRS_ZFUNC: u32 = 23;
pub const D3DRS_ALPHAREF: u32 = 24;
pub const D3DRS_ALPHAFUNC: u32 = 25;
pub const D3DRS_DITHERENABLE: u32 = 26;
pub const D3DRS_ALPHABLENDENABLE: u32 = 27;
pub const D3DRS_FOGENABLE: u32 = 28;
pub const D3DRS_SPECULARENABLE: u32 = 29;
pub const D3DRS_FOGCOLOR: u32 = 34;
pub const D3DRS_FOGTABLEMODE: u32 = 35;
pub const D3DRS_FOGSTART: u32 = 36;
pub const D3DRS_FOGEND: u32 = 37;
pub const D3DRS_FOGDENSITY: u32 = 38;
pub const D3DRS_RANGEFOGENABLE: u32 = 48;
pub const D3DRS_STENCILENABLE: u32 = 52;
pub const D3DRS_STENCILFAIL: u32 = 53;
pub const D3DRS_STENCILZFAIL: u32 = 54;
pub const D3DRS_STENCILPASS: u32 = 55;
pub const D3DRS_STENCILFUNC: u32 = 56;
pub const D3DRS_STENCILREF: u32 = 57;
pub const D3DRS_STENCILMASK: u32 = 58;
pub const D3DRS_STENCILWRITEMASK: u32 = 59;
pub const D3DRS_TEXTUREFACTOR: u32 = 60;
pub const D3DRS_WRAP0: u32 = 128;
pub const D3DRS_WRAP1: u32 = 129;
pub const D3DRS_WRAP2: u32 = 130;
pub const D3DRS_WRAP3: u32 = 131;
pub const D3DRS_WRAP4: u32 = 132;
pub const D3DRS_WRAP5: u32 = 133;
pub const D3DRS_WRAP6: u32 = 134;
pub const D3DRS_WRAP7: u32 = 135;
pub const D3DRS_CLIPPING: u32 = 136;
pub const D3DRS_LIGHTING: u32 = 137;
pub const D3DRS_AMBIENT: u32 = 139;
pub const D3DRS_FOGVERTEXMODE: u32 = 140;
pub const D3DRS_COLORVERTEX: u32 = 141;
pub const D3DRS_LOCALVIEWER: u32 = 142;
pub const D3DRS_NORMALIZENORMALS: u32 = 143;
pub const D3DRS_DIFFUSEMATERIALSOURCE: u32 = 145;
pub const D3DRS_SPECULARMATERIALSOURCE: u32 = 146;
pub const D3DRS_AMBIENTMATERIALSOURCE: u32 = 147;
pub const D3DRS_EMISSIVEMATERIALSOURCE: u32 = 148;
pub const D3DRS_VERTEXBLEND: u32 = 151;
pub const D3DRS_CLIPPLANEENABLE: u32 = 152;
pub const D3DRS_POINTSIZE: u32 = 154;
pub const D3DRS_POINTSIZE_MIN: u32 = 155;
pub const D3DRS_POINTSPRITEENABLE: u32 = 156;
pub const D3DRS_POINTSCALEENABLE: u32 = 157;
pub const D3DRS_POINTSCALE_A: u32 = 158;
pub const D3DRS_POINTSCALE_B: u32 = 159;
pub const D3DRS_POINTSCALE_C: u32 = 160;
pub const D3DRS_MULTISAMPLEANTIALIAS: u32 = 161;
pub const D3DRS_MULTISAMPLEMASK: u32 = 162;
pub const D3DRS_PATCHEDGESTYLE: u32 = 163;
pub const D3DRS_DEBUGMONITORTOKEN: u32 = 165;
pub const D3DRS_POINTSIZE_MAX: u32 = 166;
pub const D3DRS_INDEXEDVERTEXBLENDENABLE: u32 = 167;
pub const D3DRS_COLORWRITEENABLE: u32 = 168;
pub const D3DRS_TWEENFACTOR: u32 = 170;
pub const D3DRS_BLENDOP: u32 = 171;
pub const D3DRS_POSITIONDEGREE: u32 = 172;
pub const D3DRS_NORMALDEGREE: u32 = 173;
pub const D3DRS_SCISSORTESTENABLE: u32 = 174;
pub const D3DRS_SLOPESCALEDEPTHBIAS: u32 = 175;
pub const D3DRS_ANTIALIASEDLINEENABLE: u32 = 176;
pub const D3DRS_MINTESSELLATIONLEVEL: u32 = 178;
pub const D3DRS_MAXTESSELLATIONLEVEL: u32 = 179;
pub const D3DRS_ADAPTIVETESS_X: u32 = 180;
pub const D3DRS_ADAPTIVETESS_Y: u32 = 181;
pub const D3DRS_ADAPTIVETESS_Z: u32 = 182;
pub const D3DRS_ADAPTIVETESS_W: u32 = 183;
pub const D3DRS_ENABLEADAPTIVETESSELLATION: u32 = 184;
pub const D3DRS_TWOSIDEDSTENCILMODE: u32 = 185;
pub const D3DRS_CCW_STENCILFAIL: u32 = 186;
pub const D3DRS_CCW_STENCILZFAIL: u32 = 187;
pub const D3DRS_CCW_STENCILPASS: u32 = 188;
pub const D3DRS_CCW_STENCILFUNC: u32 = 189;
pub const D3DRS_COLORWRITEENABLE1: u32 = 190;
pub const D3DRS_COLORWRITEENABLE2: u32 = 191;
pub const D3DRS_COLORWRITEENABLE3: u32 = 192;
pub const D3DRS_BLENDFACTOR: u32 = 193;
pub const D3DRS_SRGBWRITEENABLE: u32 = 194;
pub const D3DRS_DEPTHBIAS: u32 = 195;
pub const D3DRS_WRAP8: u32 = 198;
pub const D3DRS_WRAP9: u32 = 199;
pub const D3DRS_WRAP10: u32 = 200;
pub const D3DRS_WRAP11: u32 = 201;
pub const D3DRS_WRAP12: u32 = 202;
pub const D3DRS_WRAP13: u32 = 203;
pub const D3DRS_WRAP14: u32 = 204;
pub const D3DRS_WRAP15: u32 = 205;
pub const D3DRS_SEPARATEALPHABLENDENABLE: u32 = 206;
pub const D3DRS_SRCBLENDALPHA: u32 = 207;
pub const D3DRS_DESTBLENDALPHA: u32 = 208;
pub const D3DRS_BLENDOPALPHA: u32 = 209;

// D3DTEXTURESTAGESTATETYPE
pub const D3DTSS_COLOROP: u32 = 1;
pub const D3DTSS_COLORARG1: u32 = 2;
pub const D3DTSS_COLORARG2: u32 = 3;
pub const D3DTSS_ALPHAOP: u32 = 4;
pub const D3DTSS_ALPHAARG1: u32 = 5;
pub const D3DTSS_ALPHAARG2: u32 = 6;
pub const D3DTSS_BUMPENVMAT00: u32 = 7;
pub const D3DTSS_BUMPENVMAT01: u32 = 8;
pub const D3DTSS_BUMPENVMAT10: u32 = 9;
pub const D3DTSS_BUMPENVMAT11: u32 = 10;
pub const D3DTSS_TEXCOORDINDEX: u32 = 11;
pub const D3DTSS_BUMPENVLSCALE: u32 = 22;
pub const D3DTSS_BUMPENVLOFFSET: u32 = 23;
pub const D3DTSS_TEXTURETRANSFORMFLAGS: u32 = 24;
pub const D3DTSS_COLORARG0: u32 = 26;
pub const D3DTSS_ALPHAARG0: u32 = 27;
pub const D3DTSS_RESULTARG: u32 = 28;
pub const D3DTSS_CONSTANT: u32 = 32;

// D3DTRANSFORMSTATETYPE
pub const D3DTS_VIEW: u32 = 2;
pub const D3DTS_PROJECTION: u32 = 3;
pub const D3DTS_TEXTURE0: u32 = 16;
pub const D3DTS_WORLD: u32 = 256;

// D3DSAMPLERSTATETYPE
pub const D3DSAMP_ADDRESSU: u32 = 1;
pub const D3DSAMP_ADDRESSV: u32 = 2;
pub const D3DSAMP_ADDRESSW: u32 = 3;
pub const D3DSAMP_BORDERCOLOR: u32 = 4;
pub const D3DSAMP_MAGFILTER: u32 = 5;
pub const D3DSAMP_MINFILTER: u32 = 6;
pub const D3DSAMP_MIPFILTER: u32 = 7;
pub const D3DSAMP_MIPMAPLODBIAS: u32 = 8;
pub const D3DSAMP_MAXMIPLEVEL: u32 = 9;
pub const D3DSAMP_MAXANISOTROPY: u32 = 10;
pub const D3DSAMP_SRGBTEXTURE: u32 = 11;
pub const D3DSAMP_ELEMENTINDEX: u32 = 12;
pub const D3DSAMP_DMAPOFFSET: u32 = 13;

// Material fields.
pub const MATERIAL_DIFFUSE: u32 = 0;
pub const MATERIAL_AMBIENT: u32 = 1;
pub const MATERIAL_SPECULAR: u32 = 2;
pub const MATERIAL_EMISSIVE: u32 = 3;
pub const MATERIAL_POWER: u32 = 4;

// Light fields.
pub const LIGHT_TYPE: u32 = 0;
pub const LIGHT_DIFFUSE: u32 = 1;
pub const LIGHT_SPECULAR: u32 = 2;
pub const LIGHT_AMBIENT: u32 = 3;
pub const LIGHT_POSITION: u32 = 4;
pub const LIGHT_DIRECTION: u32 = 5;
pub const LIGHT_RANGE: u32 = 6;
pub const LIGHT_FALLOFF: u32 = 7;
pub const LIGHT_ATTENUATION0: u32 = 8;
pub const LIGHT_ATTENUATION1: u32 = 9;
pub const LIGHT_ATTENUATION2: u32 = 10;
pub const LIGHT_THETA: u32 = 11;
pub const LIGHT_PHI: u32 = 12;

// Shader constant register files.
pub const SHADER_CONST_VS_FLOAT: u32 = 0;
pub const SHADER_CONST_VS_BOOL: u32 = 1;
pub const SHADER_CONST_VS_INT: u32 = 2;
pub const SHADER_CONST_PS_FLOAT: u32 = 3;
pub const SHADER_CONST_PS_BOOL: u32 = 4;
pub const SHADER_CONST_PS_INT: u32 = 5;

const fn rs(op: u32, name: &'static str) -> StateInfo {
    StateInfo {
        class: StateClass::RenderState,
        op,
        name,
    }
}

const fn tss(op: u32, name: &'static str) -> StateInfo {
    StateInfo {
        class: StateClass::TextureStage,
        op,
        name,
    }
}

const fn entry(class: StateClass, op: u32, name: &'static str) -> StateInfo {
    StateInfo { class, op, name }
}

/// Every state operation, in bundle order.
pub static STATE_TABLE: &[StateInfo] = &[
    rs(D3DRS_ZENABLE, "ZEnable"),
    rs(D3DRS_FILLMODE, "FillMode"),
    rs(D3DRS_SHADEMODE, "ShadeMode"),
    rs(D3DRS_ZWRITEENABLE, "ZWriteEnable"),
    rs(D3DRS_ALPHATESTENABLE, "AlphaTestEnable"),
    rs(D3DRS_LASTPIXEL, "LastPixel"),
    rs(D3DRS_SRCBLEND, "SrcBlend"),
    rs(D3DRS_DESTBLEND, "DestBlend"),
    rs(D3DRS_CULLMODE, "CullMode"),
    rs(D3DRS_ZFUNC, "ZFunc"),
    rs(D3DRS_ALPHAREF, "AlphaRef"),
    rs(D3DRS_ALPHAFUNC, "AlphaFunc"),
    rs(D3DRS_DITHERENABLE, "DitherEnable"),
    rs(D3DRS_ALPHABLENDENABLE, "AlphaBlendEnable"),
    rs(D3DRS_FOGENABLE, "FogEnable"),
    rs(D3DRS_SPECULARENABLE, "SpecularEnable"),
    rs(D3DRS_FOGCOLOR, "FogColor"),
    rs(D3DRS_FOGTABLEMODE, "FogTableMode"),
    rs(D3DRS_FOGSTART, "FogStart"),
    rs(D3DRS_FOGEND, "FogEnd"),
    rs(D3DRS_FOGDENSITY, "FogDensity"),
    rs(D3DRS_RANGEFOGENABLE, "RangeFogEnable"),
    rs(D3DRS_STENCILENABLE, "StencilEnable"),
    rs(D3DRS_STENCILFAIL, "StencilFail"),
    rs(D3DRS_STENCILZFAIL, "StencilZFail"),
    rs(D3DRS_STENCILPASS, "StencilPass"),
    rs(D3DRS_STENCILFUNC, "StencilFunc"),
    rs(D3DRS_STENCILREF, "StencilRef"),
    rs(D3DRS_STENCILMASK, "StencilMask"),
    rs(D3DRS_STENCILWRITEMASK, "StencilWriteMask"),
    rs(D3DRS_TEXTUREFACTOR, "TextureFactor"),
    rs(D3DRS_WRAP0, "Wrap0"),
    rs(D3DRS_WRAP1, "Wrap1"),
    rs(D3DRS_WRAP2, "Wrap2"),
    rs(D3DRS_WRAP3, "Wrap3"),
    rs(D3DRS_WRAP4, "Wrap4"),
    rs(D3DRS_WRAP5, "Wrap5"),
    rs(D3DRS_WRAP6, "Wrap6"),
    rs(D3DRS_WRAP7, "Wrap7"),
    rs(D3DRS_WRAP8, "Wrap8"),
    rs(D3DRS_WRAP9, "Wrap9"),
    rs(D3DRS_WRAP10, "Wrap10"),
    rs(D3DRS_WRAP11, "Wrap11"),
    rs(D3DRS_WRAP12, "Wrap12"),
    rs(D3DRS_WRAP13, "Wrap13"),
    rs(D3DRS_WRAP14, "Wrap14"),
    rs(D3DRS_WRAP15, "Wrap15"),
    rs(D3DRS_CLIPPING, "Clipping"),
    rs(D3DRS_LIGHTING, "Lighting"),
    rs(D3DRS_AMBIENT, "Ambient"),
    rs(D3DRS_FOGVERTEXMODE, "FogVertexMode"),
    rs(D3DRS_COLORVERTEX, "ColorVertex"),
    rs(D3DRS_LOCALVIEWER, "LocalViewer"),
    rs(D3DRS_NORMALIZENORMALS, "NormalizeNormals"),
    rs(D3DRS_DIFFUSEMATERIALSOURCE, "DiffuseMaterialSource"),
    rs(D3DRS_SPECULARMATERIALSOURCE, "SpecularMaterialSource"),
    rs(D3DRS_AMBIENTMATERIALSOURCE, "AmbientMaterialSource"),
    rs(D3DRS_EMISSIVEMATERIALSOURCE, "EmissiveMaterialSource"),
    rs(D3DRS_VERTEXBLEND, "VertexBlend"),
    rs(D3DRS_CLIPPLANEENABLE, "ClipPlaneEnable"),
    rs(D3DRS_POINTSIZE, "PointSize"),
    rs(D3DRS_POINTSIZE_MIN, "PointSize_Min"),
    rs(D3DRS_POINTSIZE_MAX, "PointSize_Max"),
    rs(D3DRS_POINTSPRITEENABLE, "PointSpriteEnable"),
    rs(D3DRS_POINTSCALEENABLE, "PointScaleEnable"),
    rs(D3DRS_POINTSCALE_A, "PointScale_A"),
    rs(D3DRS_POINTSCALE_B, "PointScale_B"),
    rs(D3DRS_POINTSCALE_C, "PointScale_C"),
    rs(D3DRS_MULTISAMPLEANTIALIAS, "MultiSampleAntialias"),
    rs(D3DRS_MULTISAMPLEMASK, "MultiSampleMask"),
    rs(D3DRS_PATCHEDGESTYLE, "PatchEdgeStyle"),
    rs(D3DRS_DEBUGMONITORTOKEN, "DebugMonitorToken"),
    rs(D3DRS_INDEXEDVERTEXBLENDENABLE, "IndexedVertexBlendEnable"),
    rs(D3DRS_COLORWRITEENABLE, "ColorWriteEnable"),
    rs(D3DRS_TWEENFACTOR, "TweenFactor"),
    rs(D3DRS_BLENDOP, "BlendOp"),
    rs(D3DRS_POSITIONDEGREE, "PositionDegree"),
    rs(D3DRS_NORMALDEGREE, "NormalDegree"),
    rs(D3DRS_SCISSORTESTENABLE, "ScissorTestEnable"),
    rs(D3DRS_SLOPESCALEDEPTHBIAS, "SlopeScaleDepthBias"),
    rs(D3DRS_ANTIALIASEDLINEENABLE, "AntialiasedLineEnable"),
    rs(D3DRS_MINTESSELLATIONLEVEL, "MinTessellationLevel"),
    rs(D3DRS_MAXTESSELLATIONLEVEL, "MaxTessellationLevel"),
    rs(D3DRS_ADAPTIVETESS_X, "AdaptiveTess_X"),
    rs(D3DRS_ADAPTIVETESS_Y, "AdaptiveTess_Y"),
    rs(D3DRS_ADAPTIVETESS_Z, "AdaptiveTess_Z"),
    rs(D3DRS_ADAPTIVETESS_W, "AdaptiveTess_W"),
    rs(D3DRS_ENABLEADAPTIVETESSELLATION, "EnableAdaptiveTessellation"),
    rs(D3DRS_TWOSIDEDSTENCILMODE, "TwoSidedStencilMode"),
    rs(D3DRS_CCW_STENCILFAIL, "CCW_StencilFail"),
    rs(D3DRS_CCW_STENCILZFAIL, "CCW_StencilZFail"),
    rs(D3DRS_CCW_STENCILPASS, "CCW_StencilPass"),
    rs(D3DRS_CCW_STENCILFUNC, "CCW_StencilFunc"),
    rs(D3DRS_COLORWRITEENABLE1, "ColorWriteEnable1"),
    rs(D3DRS_COLORWRITEENABLE2, "ColorWriteEnable2"),
    rs(D3DRS_COLORWRITEENABLE3, "ColorWriteEnable3"),
    rs(D3DRS_BLENDFACTOR, "BlendFactor"),
    rs(D3DRS_SRGBWRITEENABLE, "SRGBWriteEnable"),
    rs(D3DRS_DEPTHBIAS, "DepthBias"),
    rs(D3DRS_SEPARATEALPHABLENDENABLE, "SeparateAlphaBlendEnable"),
    rs(D3DRS_SRCBLENDALPHA, "SrcBlendAlpha"),
    rs(D3DRS_DESTBLENDALPHA, "DestBlendAlpha"),
    rs(D3DRS_BLENDOPALPHA, "BlendOpAlpha"),
    tss(D3DTSS_COLOROP, "ColorOp"),
    tss(D3DTSS_COLORARG0, "ColorArg0"),
    tss(D3DTSS_COLORARG1, "ColorArg1"),
    tss(D3DTSS_COLORARG2, "ColorArg2"),
    tss(D3DTSS_ALPHAOP, "AlphaOp"),
    tss(D3DTSS_ALPHAARG0, "AlphaArg0"),
    tss(D3DTSS_ALPHAARG1, "AlphaArg1"),
    tss(D3DTSS_ALPHAARG2, "AlphaArg2"),
    tss(D3DTSS_RESULTARG, "ResultArg"),
    tss(D3DTSS_BUMPENVMAT00, "BumpEnvMat00"),
    tss(D3DTSS_BUMPENVMAT01, "BumpEnvMat01"),
    tss(D3DTSS_BUMPENVMAT10, "BumpEnvMat10"),
    tss(D3DTSS_BUMPENVMAT11, "BumpEnvMat11"),
    tss(D3DTSS_BUMPENVLSCALE, "BumpEnvLScale"),
    tss(D3DTSS_BUMPENVLOFFSET, "BumpEnvLOffset"),
    tss(D3DTSS_TEXCOORDINDEX, "TexCoordIndex"),
    tss(D3DTSS_TEXTURETRANSFORMFLAGS, "TextureTransformFlags"),
    tss(D3DTSS_CONSTANT, "Constant"),
    entry(StateClass::NPatchMode, 0, "NPatchMode"),
    entry(StateClass::Fvf, 0, "FVF"),
    entry(StateClass::Transform, D3DTS_PROJECTION, "ProjectionTransform"),
    entry(StateClass::Transform, D3DTS_VIEW, "ViewTransform"),
    entry(StateClass::Transform, D3DTS_WORLD, "WorldTransform"),
    entry(StateClass::Transform, D3DTS_TEXTURE0, "TextureTransform"),
    entry(StateClass::Material, MATERIAL_DIFFUSE, "MaterialDiffuse"),
    entry(StateClass::Material, MATERIAL_AMBIENT, "MaterialAmbient"),
    entry(StateClass::Material, MATERIAL_SPECULAR, "MaterialSpecular"),
    entry(StateClass::Material, MATERIAL_EMISSIVE, "MaterialEmissive"),
    entry(StateClass::Material, MATERIAL_POWER, "MaterialPower"),
    entry(StateClass::Light, LIGHT_TYPE, "LightType"),
    entry(StateClass::Light, LIGHT_DIFFUSE, "LightDiffuse"),
    entry(StateClass::Light, LIGHT_SPECULAR, "LightSpecular"),
    entry(StateClass::Light, LIGHT_AMBIENT, "LightAmbient"),
    entry(StateClass::Light, LIGHT_POSITION, "LightPosition"),
    entry(StateClass::Light, LIGHT_DIRECTION, "LightDirection"),
    entry(StateClass::Light, LIGHT_RANGE, "LightRange"),
    entry(StateClass::Light, LIGHT_FALLOFF, "LightFalloff"),
    entry(StateClass::Light, LIGHT_ATTENUATION0, "LightAttenuation0"),
    entry(StateClass::Light, LIGHT_ATTENUATION1, "LightAttenuation1"),
    entry(StateClass::Light, LIGHT_ATTENUATION2, "LightAttenuation2"),
    entry(StateClass::Light, LIGHT_THETA, "LightTheta"),
    entry(StateClass::Light, LIGHT_PHI, "LightPhi"),
    entry(StateClass::LightEnable, 0, "LightEnable"),
    entry(StateClass::VertexShader, 0, "VertexShader"),
    entry(StateClass::PixelShader, 0, "PixelShader"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_FLOAT, "VertexShaderConstantF"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_BOOL, "VertexShaderConstantB"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_INT, "VertexShaderConstantI"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_FLOAT, "VertexShaderConstant"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_FLOAT, "VertexShaderConstant1"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_FLOAT, "VertexShaderConstant2"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_FLOAT, "VertexShaderConstant3"),
    entry(StateClass::ShaderConstant, SHADER_CONST_VS_FLOAT, "VertexShaderConstant4"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_FLOAT, "PixelShaderConstantF"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_BOOL, "PixelShaderConstantB"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_INT, "PixelShaderConstantI"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_FLOAT, "PixelShaderConstant"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_FLOAT, "PixelShaderConstant1"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_FLOAT, "PixelShaderConstant2"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_FLOAT, "PixelShaderConstant3"),
    entry(StateClass::ShaderConstant, SHADER_CONST_PS_FLOAT, "PixelShaderConstant4"),
    entry(StateClass::Texture, 0, "Texture"),
    entry(StateClass::SamplerState, D3DSAMP_ADDRESSU, "AddressU"),
    entry(StateClass::SamplerState, D3DSAMP_ADDRESSV, "AddressV"),
    entry(StateClass::SamplerState, D3DSAMP_ADDRESSW, "AddressW"),
    entry(StateClass::SamplerState, D3DSAMP_BORDERCOLOR, "BorderColor"),
    entry(StateClass::SamplerState, D3DSAMP_MAGFILTER, "MagFilter"),
    entry(StateClass::SamplerState, D3DSAMP_MINFILTER, "MinFilter"),
    entry(StateClass::SamplerState, D3DSAMP_MIPFILTER, "MipFilter"),
    entry(StateClass::SamplerState, D3DSAMP_MIPMAPLODBIAS, "MipMapLodBias"),
    entry(StateClass::SamplerState, D3DSAMP_MAXMIPLEVEL, "MaxMipLevel"),
    entry(StateClass::SamplerState, D3DSAMP_MAXANISOTROPY, "MaxAnisotropy"),
    entry(StateClass::SamplerState, D3DSAMP_SRGBTEXTURE, "SRGBTexture"),
    entry(StateClass::SamplerState, D3DSAMP_ELEMENTINDEX, "ElementIndex"),
    entry(StateClass::SamplerState, D3DSAMP_DMAPOFFSET, "DMAPOffset"),
    entry(StateClass::Sampler, 0, "Sampler"),
];

/// Position of the first entry named `name` (case-insensitive).
pub fn find_by_name(name: &str) -> Option<usize> {
    STATE_TABLE
        .iter()
        .position(|info| info.name.eq_ignore_ascii_case(name))
}

/// Position of the first entry with the given class and native op.
pub fn find(class: StateClass, op: u32) -> Option<usize> {
    STATE_TABLE
        .iter()
        .position(|info| info.class == class && info.op == op)
}
