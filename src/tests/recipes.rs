use pretty_assertions::assert_eq;

use crate::{compiler::CompileOptions, recipe::Recipe};

make_tests::make_recipe_tests!();

fn cook(path: &str) -> String {
    let recipe = Recipe::from_file(path).unwrap();
    let options = recipe.options(CompileOptions::default());
    recipe.cook(&options).unwrap()
}

#[test]
fn glow_recipe_output() {
    assert_eq!(
        cook("recipes/glow.json"),
        "precision mediump float;
uniform sampler2D u_texture;
uniform bool u_pulse;
uniform float u_time;
varying mediump vec2 v_uv;

void main(void) {
    vec4 tmp0 = texture2D(u_texture, v_uv);
    float tmp1;
    if (u_pulse) {
        tmp1 = 0.5 + (0.5 * sin(u_time * 3.0));
    } else {
        tmp1 = 1.0;
    }
    gl_FragColor = vec4(tmp0.rgb * tmp1, tmp0.a);
}
"
    );
}

#[test]
fn recipes_cook_deterministically() {
    for path in ["recipes/glow.json", "recipes/transform.json"] {
        assert_eq!(cook(path), cook(path));
    }
}
